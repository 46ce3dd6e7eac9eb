//! Modifier catalogue for `{path.modifier(args)}` chains.
//!
//! Every modifier is a pure function of its subject and evaluated arguments.
//! An unknown modifier, or a modifier applied to a value it does not
//! support, yields `Null`.

use crate::value::Value;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::cmp::Ordering;
use tracing::debug;

const DEFAULT_TRUNCATE_SUFFIX: &str = "…";
const DEFAULT_DATE_FORMAT: &str = "F j, Y";
const MAX_NUMBER_DECIMALS: usize = 20;

pub fn apply(name: &str, subject: &Value, args: &[Value]) -> Value {
    match name {
        "toUpperCase" => map_text(subject, |s| s.to_uppercase()),
        "toLowerCase" => map_text(subject, |s| s.to_lowercase()),
        "trim" => map_text(subject, |s| s.trim().to_string()),
        "ltrim" => map_text(subject, |s| s.trim_start().to_string()),
        "rtrim" => map_text(subject, |s| s.trim_end().to_string()),
        "length" => length(subject),
        "toInt" => to_int(subject),
        "toString" => Value::String(subject.to_string()),
        "toBool" => Value::Boolean(subject.is_truthy()),
        "ceil" => map_number(subject, f64::ceil),
        "floor" => map_number(subject, f64::floor),
        "round" => round(subject, arg_number(args, 0).unwrap_or(0.0)),
        "includes" => includes(subject, args),
        "startsWith" => match (text(subject), args.first()) {
            (Some(s), Some(prefix)) => Value::Boolean(s.starts_with(&prefix.to_string())),
            _ => Value::Null,
        },
        "endsWith" => match (text(subject), args.first()) {
            (Some(s), Some(suffix)) => Value::Boolean(s.ends_with(&suffix.to_string())),
            _ => Value::Null,
        },
        "equal" => compare(subject, args, |a, b| a.loose_eq(b)),
        "greater" => compare(subject, args, |a, b| {
            a.loose_cmp(b) == Some(Ordering::Greater)
        }),
        "less" => compare(subject, args, |a, b| a.loose_cmp(b) == Some(Ordering::Less)),
        "greaterOrEqual" => compare(subject, args, |a, b| {
            matches!(a.loose_cmp(b), Some(Ordering::Greater | Ordering::Equal))
        }),
        "lessOrEqual" => compare(subject, args, |a, b| {
            matches!(a.loose_cmp(b), Some(Ordering::Less | Ordering::Equal))
        }),
        "dateFormat" => {
            let format = arg_string(args, 0).unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
            date_format(subject, &format)
        }
        "at" => at(subject, arg_number(args, 0)),
        "slice" => slice(subject, arg_number(args, 0).unwrap_or(0.0), arg_number(args, 1)),
        "reverse" => match subject {
            Value::Array(items) => Value::Array(items.iter().rev().cloned().collect()),
            Value::String(s) => Value::String(s.chars().rev().collect()),
            _ => Value::Null,
        },
        "join" => match subject {
            Value::Array(items) => {
                let separator = arg_string(args, 0).unwrap_or_else(|| ",".to_string());
                Value::String(
                    items
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>()
                        .join(&separator),
                )
            }
            _ => Value::Null,
        },
        "split" => match text(subject) {
            Some(s) => {
                let separator = arg_string(args, 0).unwrap_or_else(|| ",".to_string());
                if s.is_empty() {
                    Value::Array(vec![])
                } else if separator.is_empty() {
                    Value::Array(s.chars().map(|c| Value::String(c.to_string())).collect())
                } else {
                    Value::Array(s.split(separator.as_str()).map(Value::from).collect())
                }
            }
            None => Value::Null,
        },
        "indexOf" => index_of(subject, args.first()),
        "concat" => concat(subject, args),
        "pluck" => match (subject, arg_string(args, 0)) {
            (Value::Array(items), Some(key)) => Value::Array(
                items
                    .iter()
                    .map(|item| item.get(&key).cloned().unwrap_or_default())
                    .collect(),
            ),
            _ => Value::Null,
        },
        "truncateChars" => match (text(subject), arg_number(args, 0)) {
            (Some(s), Some(limit)) => {
                let limit = limit.max(0.0) as usize;
                if s.chars().count() <= limit {
                    Value::String(s)
                } else {
                    let suffix = arg_string(args, 1).unwrap_or_else(|| DEFAULT_TRUNCATE_SUFFIX.to_string());
                    let truncated: String = s.chars().take(limit).collect();
                    Value::String(format!("{}{}", truncated.trim_end(), suffix))
                }
            }
            _ => Value::Null,
        },
        "truncateWords" => match (text(subject), arg_number(args, 0)) {
            (Some(s), Some(limit)) => {
                let limit = limit.max(0.0) as usize;
                let words: Vec<&str> = s.split_whitespace().collect();
                if words.len() <= limit {
                    Value::String(s)
                } else {
                    let suffix = arg_string(args, 1).unwrap_or_else(|| DEFAULT_TRUNCATE_SUFFIX.to_string());
                    Value::String(format!("{}{}", words[..limit].join(" "), suffix))
                }
            }
            _ => Value::Null,
        },
        "stripTags" => map_text(subject, |s| strip_tags(&s)),
        "toSlug" => map_text(subject, |s| slugify(&s)),
        "numberFormat" => match subject.as_number() {
            Some(n) => Value::String(number_format(
                n,
                arg_number(args, 0).unwrap_or(0.0).max(0.0) as usize,
                &arg_string(args, 1).unwrap_or_else(|| ".".to_string()),
                &arg_string(args, 2).unwrap_or_else(|| ",".to_string()),
            )),
            None => Value::Null,
        },
        unknown => {
            debug!(modifier = unknown, "Unknown modifier");
            Value::Null
        }
    }
}

/// String form of scalar values; collections and null have none
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Boolean(_) => Some(value.to_string()),
        _ => None,
    }
}

fn map_text(value: &Value, f: impl FnOnce(String) -> String) -> Value {
    text(value).map(f).map(Value::String).unwrap_or_default()
}

fn map_number(value: &Value, f: impl FnOnce(f64) -> f64) -> Value {
    value.as_number().map(f).map(Value::Number).unwrap_or_default()
}

fn arg_number(args: &[Value], index: usize) -> Option<f64> {
    args.get(index).and_then(Value::as_number)
}

fn arg_string(args: &[Value], index: usize) -> Option<String> {
    args.get(index)
        .filter(|value| !value.is_null())
        .map(Value::to_string)
}

fn length(subject: &Value) -> Value {
    let len = match subject {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::Null => 0,
        _ => return Value::Null,
    };
    Value::Number(len as f64)
}

fn to_int(subject: &Value) -> Value {
    match subject {
        Value::Array(_) | Value::Object(_) => Value::Null,
        other => Value::Number(other.to_number().trunc()),
    }
}

fn round(subject: &Value, precision: f64) -> Value {
    let factor = 10f64.powi(precision.clamp(0.0, 15.0) as i32);
    map_number(subject, |n| (n * factor).round() / factor)
}

fn includes(subject: &Value, args: &[Value]) -> Value {
    let Some(needle) = args.first() else {
        return Value::Null;
    };
    match subject {
        Value::Array(items) => Value::Boolean(items.iter().any(|item| item.loose_eq(needle))),
        Value::String(s) => Value::Boolean(s.contains(&needle.to_string())),
        _ => Value::Null,
    }
}

/// Comparison modifiers return a boolean, or pick between the optional
/// `then`/`else` arguments
fn compare(subject: &Value, args: &[Value], predicate: impl Fn(&Value, &Value) -> bool) -> Value {
    let Some(other) = args.first() else {
        return Value::Null;
    };
    let result = predicate(subject, other);

    if args.len() > 1 {
        let branch = if result { args.get(1) } else { args.get(2) };
        branch.cloned().unwrap_or_default()
    } else {
        Value::Boolean(result)
    }
}

fn at(subject: &Value, index: Option<f64>) -> Value {
    let Some(index) = index else {
        return Value::Null;
    };
    let index = index.trunc() as i64;
    match subject {
        Value::Array(_) => subject.index(index).cloned().unwrap_or_default(),
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            resolve_index(chars.len(), index)
                .map(|i| Value::String(chars[i].to_string()))
                .unwrap_or_default()
        }
        _ => Value::Null,
    }
}

fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    (0..len as i64).contains(&resolved).then_some(resolved as usize)
}

/// Clamp slice bounds; negative values count from the end
fn slice_bounds(len: usize, start: f64, end: Option<f64>) -> (usize, usize) {
    let clamp = |bound: f64| {
        let bound = bound.trunc() as i64;
        let resolved = if bound < 0 { len as i64 + bound } else { bound };
        resolved.clamp(0, len as i64) as usize
    };
    let start = clamp(start);
    let end = end.map(clamp).unwrap_or(len);
    (start, end.max(start))
}

fn slice(subject: &Value, start: f64, end: Option<f64>) -> Value {
    match subject {
        Value::Array(items) => {
            let (start, end) = slice_bounds(items.len(), start, end);
            Value::Array(items[start..end].to_vec())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = slice_bounds(chars.len(), start, end);
            Value::String(chars[start..end].iter().collect())
        }
        _ => Value::Null,
    }
}

fn index_of(subject: &Value, needle: Option<&Value>) -> Value {
    let Some(needle) = needle else {
        return Value::Null;
    };
    let position = match subject {
        Value::Array(items) => items.iter().position(|item| item.loose_eq(needle)),
        Value::String(s) => s
            .find(&needle.to_string())
            .map(|byte_index| s[..byte_index].chars().count()),
        _ => return Value::Null,
    };
    Value::Number(position.map(|p| p as f64).unwrap_or(-1.0))
}

fn concat(subject: &Value, args: &[Value]) -> Value {
    match subject {
        Value::Array(items) => {
            let mut items = items.clone();
            for arg in args {
                match arg {
                    Value::Array(more) => items.extend(more.iter().cloned()),
                    other => items.push(other.clone()),
                }
            }
            Value::Array(items)
        }
        Value::Object(_) => Value::Null,
        other => {
            let mut result = other.to_string();
            for arg in args {
                result.push_str(&arg.to_string());
            }
            Value::String(result)
        }
    }
}

pub fn strip_tags(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut in_tag = false;
    for c in source.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    for c in source.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Decimals are capped at twenty places
pub fn number_format(n: f64, decimals: usize, point: &str, separator: &str) -> String {
    let decimals = decimals.min(MAX_NUMBER_DECIMALS);
    let formatted = format!("{:.*}", decimals, n.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let mut result = if n < 0.0 && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    };
    if let Some(fraction) = fraction {
        result.push_str(point);
        result.push_str(fraction);
    }
    result
}

fn date_format(subject: &Value, format: &str) -> Value {
    match parse_date(subject) {
        Some(date) => Value::String(format_php_date(&date, format)),
        None => Value::Null,
    }
}

/// Unix timestamps (numbers or numeric strings), RFC 3339, and the common
/// `Y-m-d H:i:s` / `Y-m-d` / `Ymd` storage formats
fn parse_date(subject: &Value) -> Option<NaiveDateTime> {
    let raw = match subject {
        Value::Number(n) => return timestamp(*n),
        Value::String(s) => s.trim(),
        _ => return None,
    };

    if raw.len() != 8 {
        if let Some(n) = subject.as_number() {
            return timestamp(n);
        }
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.naive_local());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(date);
        }
    }
    for pattern in ["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn timestamp(seconds: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds.trunc() as i64, 0).map(|date| date.naive_utc())
}

/// Format with PHP `date()` letters; `\` escapes the next character
pub fn format_php_date(date: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            'd' => out.push_str(&format!("{:02}", date.day())),
            'D' => out.push_str(&date.format("%a").to_string()),
            'j' => out.push_str(&date.day().to_string()),
            'l' => out.push_str(&date.format("%A").to_string()),
            'N' => out.push_str(&date.weekday().number_from_monday().to_string()),
            'S' => out.push_str(ordinal_suffix(date.day())),
            'w' => out.push_str(&date.weekday().num_days_from_sunday().to_string()),
            'F' => out.push_str(&date.format("%B").to_string()),
            'm' => out.push_str(&format!("{:02}", date.month())),
            'M' => out.push_str(&date.format("%b").to_string()),
            'n' => out.push_str(&date.month().to_string()),
            'Y' => out.push_str(&date.year().to_string()),
            'y' => out.push_str(&format!("{:02}", date.year() % 100)),
            'a' => out.push_str(if date.hour() < 12 { "am" } else { "pm" }),
            'A' => out.push_str(if date.hour() < 12 { "AM" } else { "PM" }),
            'g' => out.push_str(&date.hour12().1.to_string()),
            'G' => out.push_str(&date.hour().to_string()),
            'h' => out.push_str(&format!("{:02}", date.hour12().1)),
            'H' => out.push_str(&format!("{:02}", date.hour())),
            'i' => out.push_str(&format!("{:02}", date.minute())),
            's' => out.push_str(&format!("{:02}", date.second())),
            'U' => out.push_str(&date.and_utc().timestamp().to_string()),
            other => out.push(other),
        }
    }

    out
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
