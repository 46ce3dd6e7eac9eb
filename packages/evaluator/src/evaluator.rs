//! # Expression evaluation
//!
//! Evaluates parsed `{…}` templates against a [`Scope`].
//!
//! A template that consists of exactly one expression keeps the native type
//! of the resolved value (arrays stay arrays, numbers stay numbers). Any
//! surrounding text turns the result into a string, with every expression
//! stringified in place.
//!
//! Resolution never fails: unknown roots, missing segments and unknown
//! modifiers all produce `Null`, which renders as the empty string.

use crate::modifiers;
use crate::value::{parse_number, Map, Value};
use etch_parser::{parse_template, Argument, Expression, Literal, Step, Template, TemplatePart};
use std::borrow::Cow;
use tracing::debug;

/// Name lookup for expression roots (`this`, `props`, `item`, ...)
pub trait Scope {
    fn lookup(&self, root: &str) -> Option<&Value>;
}

impl Scope for Map {
    fn lookup(&self, root: &str) -> Option<&Value> {
        self.get(root)
    }
}

/// Parse and evaluate a template string
pub fn evaluate(source: &str, scope: &dyn Scope) -> Value {
    evaluate_template(&parse_template(source), scope)
}

pub fn evaluate_template(template: &Template, scope: &dyn Scope) -> Value {
    if let Some(expr) = template.single_expression() {
        return evaluate_expression(expr, scope);
    }

    let mut result = String::new();
    for part in &template.parts {
        match part {
            TemplatePart::Literal(s) => result.push_str(s),
            TemplatePart::Expression(expr) => {
                result.push_str(&evaluate_expression(expr, scope).to_string());
            }
        }
    }
    Value::String(result)
}

/// Evaluate a single path expression with its modifier chain
pub fn evaluate_expression(expr: &Expression, scope: &dyn Scope) -> Value {
    let mut current: Cow<'_, Value> = match scope.lookup(&expr.root) {
        Some(value) => Cow::Borrowed(value),
        None => {
            debug!(root = %expr.root, expression = %expr.source, "Unresolved expression root");
            Cow::Owned(Value::Null)
        }
    };

    for step in &expr.steps {
        current = match step {
            Step::Property(name) => descend(current, |v| v.get(name)),
            Step::Index(index) => descend(current, |v| match v {
                Value::Object(map) => map.get(&index.to_string()),
                other => other.index(*index),
            }),
            Step::Call(call) => {
                let arguments: Vec<Value> = call
                    .arguments
                    .iter()
                    .map(|arg| evaluate_argument(arg, scope))
                    .collect();
                Cow::Owned(modifiers::apply(&call.name, &current, &arguments))
            }
        };
    }

    current.into_owned()
}

fn descend<'a>(current: Cow<'a, Value>, step: impl Fn(&Value) -> Option<&Value>) -> Cow<'a, Value> {
    match current {
        Cow::Borrowed(value) => step(value)
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Owned(Value::Null)),
        Cow::Owned(value) => Cow::Owned(step(&value).cloned().unwrap_or_default()),
    }
}

fn evaluate_argument(argument: &Argument, scope: &dyn Scope) -> Value {
    match argument {
        Argument::Literal(literal) => literal_value(literal),
        Argument::Path(path) => evaluate_expression(path, scope),
    }
}

pub fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Number(n) => Value::Number(*n),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

/// Parse a bare literal: quoted string, `true`, `false`, `null` or a number
pub fn parse_literal(source: &str) -> Option<Value> {
    let trimmed = source.trim();
    match trimmed {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }

    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        return Some(Value::String(trimmed[1..trimmed.len() - 1].to_string()));
    }

    parse_number(trimmed).map(Value::Number)
}

/// Whether a string contains at least one `{…}` expression
pub fn has_expressions(source: &str) -> bool {
    source.contains('{') && parse_template(source).has_expressions()
}
