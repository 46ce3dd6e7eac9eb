//! Loop presets and the handlers that turn them into item lists.
//!
//! Presets live in a single stored option (`etch_loops` by default) that maps
//! a generated id to `{ key, type, args | data }`. A preset is found by id
//! first and by its `key` second.

use crate::host::{DataSource, Environment};
use crate::value::{Map, Value};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

pub type LoopResult<T> = Result<T, LoopError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoopError {
    #[error("Loop preset '{0}' not found")]
    PresetNotFound(String),

    #[error("Invalid loop preset '{id}': {reason}")]
    InvalidPreset { id: String, reason: String },

    #[error("Unsupported loop type '{0}'")]
    UnsupportedType(String),

    #[error("Invalid data for loop preset '{id}': {reason}")]
    InvalidData { id: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopType {
    WpQuery,
    WpUsers,
    WpTerms,
    Json,
}

impl LoopType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "wp-query" => Some(LoopType::WpQuery),
            "wp-users" => Some(LoopType::WpUsers),
            "wp-terms" => Some(LoopType::WpTerms),
            "json" => Some(LoopType::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopType::WpQuery => "wp-query",
            LoopType::WpUsers => "wp-users",
            LoopType::WpTerms => "wp-terms",
            LoopType::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopPreset {
    pub id: String,
    pub key: String,
    pub kind: LoopType,
    pub args: Value,
    pub data: Value,
}

impl LoopPreset {
    pub fn from_value(id: &str, value: &Value) -> LoopResult<Self> {
        let Value::Object(fields) = value else {
            return Err(LoopError::InvalidPreset {
                id: id.to_string(),
                reason: format!("expected an object, got {}", value.type_name()),
            });
        };

        let type_name = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| LoopError::InvalidPreset {
                id: id.to_string(),
                reason: "missing type".to_string(),
            })?;
        let kind =
            LoopType::parse(type_name).ok_or_else(|| LoopError::UnsupportedType(type_name.to_string()))?;

        Ok(Self {
            id: id.to_string(),
            key: fields.get("key").map(Value::to_string).unwrap_or_default(),
            kind,
            args: fields.get("args").cloned().unwrap_or_else(Value::empty_object),
            data: fields.get("data").cloned().unwrap_or_default(),
        })
    }
}

/// Fetches the items of one kind of preset
pub trait LoopHandler {
    /// `preset` arrives with its parameters already substituted
    fn fetch(&self, preset: &LoopPreset, data: &dyn DataSource) -> LoopResult<Vec<Value>>;
}

struct PostsHandler;
struct UsersHandler;
struct TermsHandler;
struct JsonHandler;

impl LoopHandler for PostsHandler {
    fn fetch(&self, preset: &LoopPreset, data: &dyn DataSource) -> LoopResult<Vec<Value>> {
        Ok(data.query_posts(&preset.args))
    }
}

impl LoopHandler for UsersHandler {
    fn fetch(&self, preset: &LoopPreset, data: &dyn DataSource) -> LoopResult<Vec<Value>> {
        Ok(data.query_users(&preset.args))
    }
}

impl LoopHandler for TermsHandler {
    fn fetch(&self, preset: &LoopPreset, data: &dyn DataSource) -> LoopResult<Vec<Value>> {
        Ok(data.query_terms(&preset.args))
    }
}

impl LoopHandler for JsonHandler {
    fn fetch(&self, preset: &LoopPreset, _data: &dyn DataSource) -> LoopResult<Vec<Value>> {
        let invalid = |reason: String| LoopError::InvalidData {
            id: preset.id.clone(),
            reason,
        };

        match &preset.data {
            Value::Array(items) => Ok(items.clone()),
            Value::String(source) => match serde_json::from_str::<serde_json::Value>(source) {
                Ok(serde_json::Value::Array(items)) => {
                    Ok(items.iter().map(Value::from_json).collect())
                }
                Ok(other) => Err(invalid(format!("expected a JSON array, got {}", other))),
                Err(e) => Err(invalid(e.to_string())),
            },
            other => Err(invalid(format!("expected an array, got {}", other.type_name()))),
        }
    }
}

pub struct LoopHandlerManager {
    option_name: String,
    handlers: HashMap<LoopType, Box<dyn LoopHandler>>,
}

impl LoopHandlerManager {
    pub fn new(option_name: impl Into<String>) -> Self {
        let mut manager = Self {
            option_name: option_name.into(),
            handlers: HashMap::new(),
        };
        manager.register(LoopType::WpQuery, PostsHandler);
        manager.register(LoopType::WpUsers, UsersHandler);
        manager.register(LoopType::WpTerms, TermsHandler);
        manager.register(LoopType::Json, JsonHandler);
        manager
    }

    pub fn register(&mut self, kind: LoopType, handler: impl LoopHandler + 'static) {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Look a preset up by id, then by `key`
    pub fn find_preset(&self, environment: &dyn Environment, id_or_key: &str) -> LoopResult<LoopPreset> {
        let not_found = || LoopError::PresetNotFound(id_or_key.to_string());
        if id_or_key.is_empty() {
            return Err(not_found());
        }

        let table = environment.option(&self.option_name).ok_or_else(not_found)?;
        let entries: Vec<(String, &Value)> = match &table {
            Value::Object(map) => map.iter().map(|(id, preset)| (id.clone(), preset)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, preset)| {
                    let id = preset.get("id").map(Value::to_string).unwrap_or_else(|| i.to_string());
                    (id, preset)
                })
                .collect(),
            _ => return Err(not_found()),
        };

        let (id, preset) = entries
            .iter()
            .find(|(id, _)| id == id_or_key)
            .or_else(|| {
                entries.iter().find(|(_, preset)| {
                    preset.get("key").map(Value::to_string).as_deref() == Some(id_or_key)
                })
            })
            .ok_or_else(not_found)?;

        LoopPreset::from_value(id, preset)
    }

    /// Substitute `$param` placeholders and fetch the preset's items
    pub fn materialize(
        &self,
        preset: &LoopPreset,
        params: &Map,
        data: &dyn DataSource,
    ) -> LoopResult<Vec<Value>> {
        let handler = self
            .handlers
            .get(&preset.kind)
            .ok_or_else(|| LoopError::UnsupportedType(preset.kind.as_str().to_string()))?;

        let substituted = LoopPreset {
            args: substitute(&preset.args, params),
            data: substitute(&preset.data, params),
            ..preset.clone()
        };

        let items = handler.fetch(&substituted, data)?;
        debug!(preset = %preset.id, kind = preset.kind.as_str(), items = items.len(), "Materialized loop preset");
        Ok(items)
    }

    pub fn resolve(
        &self,
        environment: &dyn Environment,
        data: &dyn DataSource,
        id_or_key: &str,
        params: &Map,
    ) -> LoopResult<Vec<Value>> {
        let preset = self.find_preset(environment, id_or_key)?;
        self.materialize(&preset, params, data)
    }

    /// Like [`resolve`](Self::resolve), degrading every failure to no items
    pub fn resolve_or_empty(
        &self,
        environment: &dyn Environment,
        data: &dyn DataSource,
        id_or_key: &str,
        params: &Map,
    ) -> Vec<Value> {
        match self.resolve(environment, data, id_or_key, params) {
            Ok(items) => items,
            Err(LoopError::PresetNotFound(id)) => {
                debug!(preset = %id, "Loop preset not found");
                Vec::new()
            }
            Err(err) => {
                warn!(preset = id_or_key, error = %err, "Loop preset could not be resolved");
                Vec::new()
            }
        }
    }
}

/// Replace `$name` placeholders. A string that is exactly one placeholder
/// takes the parameter's typed value; embedded placeholders are replaced
/// textually. Unknown names stay as written.
pub fn substitute(value: &Value, params: &Map) -> Value {
    match value {
        Value::String(s) => {
            if let Some(name) = s.strip_prefix('$') {
                if let Some(param) = params.get(name) {
                    return param.clone();
                }
            }
            Value::String(
                PLACEHOLDER
                    .replace_all(s, |caps: &Captures<'_>| match params.get(&caps[1]) {
                        Some(param) => param.to_string(),
                        None => caps[0].to_string(),
                    })
                    .into_owned(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| substitute(item, params)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}
