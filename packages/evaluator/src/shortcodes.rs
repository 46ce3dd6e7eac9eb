//! `[name attr=value]…[/name]` macro expansion.
//!
//! Handlers are registered by tag name. Tags without a handler, and tags
//! escaped as `[[name]]`, are left in the output untouched.

use crate::host::ShortcodeEngine;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

lazy_static! {
    static ref ATTRIBUTE: Regex = Regex::new(
        r#"([\w-]+)\s*=\s*"([^"]*)"|([\w-]+)\s*=\s*'([^']*)'|([\w-]+)\s*=\s*([^\s'"]+)|"([^"]*)"|'([^']*)'|(\S+)"#
    )
    .unwrap();
}

pub type ShortcodeAttributes = BTreeMap<String, String>;

/// Receives the parsed attributes and, for the enclosing form, the raw
/// content between the tags
pub type ShortcodeHandler = Box<dyn Fn(&ShortcodeAttributes, Option<&str>) -> String>;

#[derive(Default)]
pub struct ShortcodeRegistry {
    handlers: HashMap<String, ShortcodeHandler>,
}

/// One parsed opening tag
struct OpenTag<'a> {
    name: &'a str,
    attributes: &'a str,
    /// Byte offset just past the closing `]`
    end: usize,
    self_closing: bool,
}

impl ShortcodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ShortcodeAttributes, Option<&str>) -> String + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ShortcodeAttributes, Option<&str>) -> String + 'static,
    {
        self.register(name, handler);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn expand(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        let mut cursor = 0;

        while let Some(offset) = content[cursor..].find('[') {
            let start = cursor + offset;
            out.push_str(&content[cursor..start]);

            // `[[tag]]` is an escaped literal `[tag]`
            if content[start..].starts_with("[[") {
                if let Some(tag) = parse_open_tag(content, start + 1) {
                    if self.has(tag.name) && content[tag.end..].starts_with(']') {
                        out.push_str(&content[start + 1..tag.end]);
                        cursor = tag.end + 1;
                        continue;
                    }
                }
                out.push('[');
                cursor = start + 1;
                continue;
            }

            let Some(tag) = parse_open_tag(content, start) else {
                out.push('[');
                cursor = start + 1;
                continue;
            };
            let Some(handler) = self.handlers.get(tag.name) else {
                out.push('[');
                cursor = start + 1;
                continue;
            };

            let attributes = parse_attributes(tag.attributes);
            let closing = format!("[/{}]", tag.name);
            let enclosed = if tag.self_closing {
                None
            } else {
                content[tag.end..]
                    .find(&closing)
                    .map(|close| (tag.end + close, tag.end + close + closing.len()))
            };

            match enclosed {
                Some((inner_end, after)) => {
                    debug!(shortcode = tag.name, "Expanding enclosing shortcode");
                    out.push_str(&handler(&attributes, Some(&content[tag.end..inner_end])));
                    cursor = after;
                }
                None => {
                    debug!(shortcode = tag.name, "Expanding shortcode");
                    out.push_str(&handler(&attributes, None));
                    cursor = tag.end;
                }
            }
        }

        out.push_str(&content[cursor..]);
        out
    }
}

impl ShortcodeEngine for ShortcodeRegistry {
    fn do_shortcode(&self, content: &str) -> String {
        if self.handlers.is_empty() || !content.contains('[') {
            return content.to_string();
        }
        self.expand(content)
    }
}

/// Parse `[name attrs]` or `[name attrs /]` starting at the `[`
fn parse_open_tag(content: &str, start: usize) -> Option<OpenTag<'_>> {
    let body = &content[start + 1..];
    let name_len = body
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = &body[..name_len];

    let rest = &body[name_len..];
    if !(rest.starts_with(']') || rest.starts_with('/') || rest.starts_with(char::is_whitespace)) {
        return None;
    }

    let mut quote: Option<char> = None;
    for (offset, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => return None,
            (None, ']') => {
                let raw = rest[..offset].trim_end();
                let self_closing = raw.ends_with('/');
                let attributes = raw.trim_end_matches('/').trim();
                return Some(OpenTag {
                    name,
                    attributes,
                    end: start + 1 + name_len + offset + 1,
                    self_closing,
                });
            }
            (None, _) => {}
        }
    }
    None
}

/// Named attributes keep their name; positional values are keyed `0`, `1`, …
pub fn parse_attributes(source: &str) -> ShortcodeAttributes {
    let mut attributes = ShortcodeAttributes::new();
    let mut position = 0;

    for caps in ATTRIBUTE.captures_iter(source) {
        let named = [(1, 2), (3, 4), (5, 6)]
            .iter()
            .find_map(|&(name, value)| Some((caps.get(name)?, caps.get(value)?)));

        match named {
            Some((name, value)) => {
                attributes.insert(name.as_str().to_lowercase(), value.as_str().to_string());
            }
            None => {
                if let Some(value) = caps.get(7).or_else(|| caps.get(8)).or_else(|| caps.get(9)) {
                    attributes.insert(position.to_string(), value.as_str().to_string());
                    position += 1;
                }
            }
        }
    }

    attributes
}
