use super::{render_inner, BlockRenderer};
use crate::context::RenderSession;
use crate::evaluator::evaluate_expression;
use crate::value::{Map, Value};
use etch_common::Block;
use etch_parser::parse_expression;
use serde_json::Value as Json;
use tracing::debug;

/// `etch/loop`: renders its inner blocks once per item of a collection
pub struct LoopBlock;

impl BlockRenderer for LoopBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let items = collection(block, session);
        if items.is_empty() {
            debug!("Loop source is empty");
            return String::new();
        }

        let config = session.config();
        let item_id = binding_name(block, "itemId", &config.default_item_id);
        let index_id = binding_name(block, "indexId", &config.default_index_id);

        let mut output = String::new();
        for (index, item) in items.into_iter().enumerate() {
            let mut bindings = Map::new();
            bindings.insert(index_id.clone(), Value::Number(index as f64));
            bindings.insert(item_id.clone(), item);

            let mut scope = session.enter_loop(bindings);
            output.push_str(&render_inner(block, &mut scope));
        }
        output
    }
}

fn binding_name(block: &Block, attr: &str, default: &str) -> String {
    block
        .attr_string(attr)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Items from `loopId` (a stored preset) or `target` (a path or expression)
fn collection(block: &Block, session: &RenderSession<'_>) -> Vec<Value> {
    let loop_id = block
        .attr_string("loopId")
        .map(|id| session.resolve_string(&id).trim().to_string())
        .filter(|id| !id.is_empty());

    if let Some(loop_id) = loop_id {
        let params: Map = block
            .attr_object("loopParams")
            .map(|params| {
                params
                    .iter()
                    .map(|(name, raw)| (name.clone(), session.resolve_json(raw)))
                    .collect()
            })
            .unwrap_or_default();

        let host = session.host();
        return session.renderer().loop_handlers().resolve_or_empty(
            host.environment.as_ref(),
            host.data.as_ref(),
            &loop_id,
            &params,
        );
    }

    let value = match block.attr("target") {
        Some(Json::String(target)) => resolve_target(target, session),
        Some(other) => Value::from_json(other),
        None => Value::Null,
    };

    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_values().collect(),
        Value::String(source) => parse_json_collection(&source),
        _ => Vec::new(),
    }
}

/// Inline JSON written straight into `target`
fn parse_json_collection(source: &str) -> Vec<Value> {
    let trimmed = source.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return Vec::new();
    }
    match serde_json::from_str::<Json>(trimmed) {
        Ok(Json::Array(items)) => items.iter().map(Value::from_json).collect(),
        Ok(Json::Object(map)) => map.values().map(Value::from_json).collect(),
        _ => {
            debug!("Loop target string is not a JSON collection");
            Vec::new()
        }
    }
}

/// `target` may be written bare (`props.items.slice(0, 2)`), braced, or as
/// inline JSON
fn resolve_target(target: &str, session: &RenderSession<'_>) -> Value {
    let target = target.trim();
    if target.starts_with('[') {
        return Value::string(target);
    }
    if target.contains('{') {
        return session.resolve(target);
    }
    match parse_expression(target) {
        Ok(expr) => evaluate_expression(&expr, session),
        Err(err) => {
            debug!(target, error = %err, "Invalid loop target");
            Value::Null
        }
    }
}
