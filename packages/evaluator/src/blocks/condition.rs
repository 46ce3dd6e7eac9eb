use super::{render_inner, BlockRenderer};
use crate::context::RenderSession;
use crate::evaluator::{evaluate_expression, has_expressions, parse_literal, Scope};
use crate::value::Value;
use etch_common::Block;
use etch_parser::parse_expression;
use serde_json::Value as Json;
use std::cmp::Ordering;
use tracing::debug;

/// `etch/condition`: renders its inner content when the condition holds
pub struct ConditionBlock;

impl BlockRenderer for ConditionBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let passes = match block.attrs.get("condition") {
            None | Some(Json::Null) => true,
            Some(condition) => evaluate_condition(condition, session),
        };

        if passes {
            render_inner(block, session)
        } else {
            String::new()
        }
    }
}

/// Evaluate a `{ leftHand, operator, rightHand }` tree. Hands may be nested
/// conditions. Unknown or missing operators are false.
pub fn evaluate_condition(condition: &Json, session: &RenderSession<'_>) -> bool {
    match condition {
        Json::Object(fields) => {
            let left = fields.get("leftHand").unwrap_or(&Json::Null);
            let right = fields.get("rightHand").unwrap_or(&Json::Null);
            let Some(operator) = fields.get("operator").and_then(Json::as_str) else {
                debug!("Condition without operator");
                return false;
            };

            match operator {
                "&&" => operand(left, session).is_truthy() && operand(right, session).is_truthy(),
                "||" => operand(left, session).is_truthy() || operand(right, session).is_truthy(),
                "isTruthy" => operand(left, session).is_truthy(),
                "isFalsy" => !operand(left, session).is_truthy(),
                "==" => operand(left, session).loose_eq(&operand(right, session)),
                "!=" => !operand(left, session).loose_eq(&operand(right, session)),
                "===" => operand(left, session).strict_eq(&operand(right, session)),
                "!==" => !operand(left, session).strict_eq(&operand(right, session)),
                ">" => ordering(left, right, session) == Some(Ordering::Greater),
                "<" => ordering(left, right, session) == Some(Ordering::Less),
                ">=" => matches!(
                    ordering(left, right, session),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                "<=" => matches!(
                    ordering(left, right, session),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                unknown => {
                    debug!(operator = unknown, "Unknown condition operator");
                    false
                }
            }
        }
        Json::String(source) => session.resolve(source).is_truthy(),
        Json::Bool(b) => *b,
        _ => false,
    }
}

fn ordering(left: &Json, right: &Json, session: &RenderSession<'_>) -> Option<Ordering> {
    operand(left, session).loose_cmp(&operand(right, session))
}

/// Resolve one hand of a comparison
fn operand(hand: &Json, session: &RenderSession<'_>) -> Value {
    match hand {
        Json::Object(fields) if fields.contains_key("operator") => {
            Value::Boolean(evaluate_condition(hand, session))
        }
        Json::String(source) => leaf(source, session),
        other => Value::from_json(other),
    }
}

fn leaf(source: &str, session: &RenderSession<'_>) -> Value {
    if has_expressions(source) {
        return session.resolve(source);
    }
    if let Some(literal) = parse_literal(source) {
        return literal;
    }
    if let Ok(expr) = parse_expression(source.trim()) {
        if session.lookup(&expr.root).is_some() {
            return evaluate_expression(&expr, session);
        }
    }
    Value::String(source.to_string())
}
