//! Component property resolution.
//!
//! Each definition takes its raw value from the instance attributes when the
//! key is present there (even as `null` or `""`), and from its default
//! otherwise. Instance values are evaluated in the caller's scope. Defaults
//! are evaluated in a scope whose `props` holds the props of the new
//! component resolved so far, so a default that refers to its own key sees
//! nothing and resolves empty.

use crate::context::RenderSession;
use crate::evaluator::Scope;
use crate::value::{Map, Value};
use serde_json::{Map as JsonMap, Value as Json};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Property definition is not an object")]
    NotAnObject,

    #[error("Property definition has no key")]
    MissingKey,

    #[error("Property '{key}' has unknown primitive type '{primitive}'")]
    UnknownPrimitive { key: String, primitive: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialized {
    Color,
    Url,
    Image,
    Select,
    /// A loop source: an array, a loop preset, JSON or a comma list
    Array,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub key: String,
    pub primitive: Primitive,
    pub specialized: Option<Specialized>,
    pub default: Json,
    pub options: Vec<String>,
}

impl PropertyDefinition {
    pub fn from_json(json: &Json) -> Result<Self, DefinitionError> {
        let fields = json.as_object().ok_or(DefinitionError::NotAnObject)?;

        let key = fields
            .get("key")
            .and_then(Json::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(DefinitionError::MissingKey)?
            .to_string();

        let ty = fields.get("type");
        let primitive_name = ty
            .and_then(|ty| ty.get("primitive"))
            .and_then(Json::as_str)
            .unwrap_or("");
        let primitive = match primitive_name {
            "string" => Primitive::String,
            "number" => Primitive::Number,
            "boolean" => Primitive::Boolean,
            "object" => Primitive::Object,
            "array" => Primitive::Array,
            other => {
                return Err(DefinitionError::UnknownPrimitive {
                    key,
                    primitive: other.to_string(),
                })
            }
        };

        let specialized = match ty.and_then(|ty| ty.get("specialized")).and_then(Json::as_str) {
            Some("color") => Some(Specialized::Color),
            Some("url") => Some(Specialized::Url),
            Some("image") => Some(Specialized::Image),
            Some("select") => Some(Specialized::Select),
            Some("array") => Some(Specialized::Array),
            _ => None,
        };

        let options = fields
            .get("options")
            .and_then(Json::as_array)
            .map(|options| {
                options
                    .iter()
                    .map(|option| match option {
                        Json::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            key,
            primitive,
            specialized,
            default: fields.get("default").cloned().unwrap_or(Json::Null),
            options,
        })
    }

    /// Parse a stored definition list, skipping invalid entries
    pub fn parse_list(definitions: &[Json]) -> Vec<Self> {
        definitions
            .iter()
            .filter_map(|json| match Self::from_json(json) {
                Ok(definition) => Some(definition),
                Err(err) => {
                    debug!(error = %err, "Skipping property definition");
                    None
                }
            })
            .collect()
    }

    fn is_loop_source(&self) -> bool {
        self.specialized == Some(Specialized::Array)
    }
}

/// Scope used for defaults: `props` is the partially resolved prop set
struct DefaultScope<'a> {
    props: Value,
    base: &'a dyn Scope,
}

impl Scope for DefaultScope<'_> {
    fn lookup(&self, root: &str) -> Option<&Value> {
        if root == "props" {
            Some(&self.props)
        } else {
            self.base.lookup(root)
        }
    }
}

/// Resolve every valid definition. `session` supplies the caller scope.
pub fn resolve_properties(
    definitions: &[PropertyDefinition],
    instance_attributes: &JsonMap<String, Json>,
    session: &RenderSession<'_>,
) -> Map {
    let mut resolved = Map::new();

    for definition in definitions {
        let value = match instance_attributes.get(&definition.key) {
            Some(raw) => coerce(definition, raw, session, session),
            None => {
                let scope = DefaultScope {
                    props: Value::Object(resolved.clone()),
                    base: session,
                };
                coerce(definition, &definition.default, &scope, session)
            }
        };
        resolved.insert(definition.key.clone(), value);
    }

    resolved
}

fn coerce(definition: &PropertyDefinition, raw: &Json, scope: &dyn Scope, session: &RenderSession<'_>) -> Value {
    let value = match raw {
        Json::String(s) => session.resolve_in(s, scope),
        other => Value::from_json(other),
    };

    if definition.is_loop_source() {
        return loop_source(raw, value, session);
    }

    match definition.primitive {
        Primitive::String => match value {
            Value::String(_) => value,
            Value::Null => Value::String(String::new()),
            other => Value::String(other.to_string()),
        },
        Primitive::Number => match value {
            Value::Number(_) => value,
            Value::Null => Value::Number(0.0),
            Value::Boolean(b) => Value::Number(f64::from(u8::from(b))),
            other => other
                .as_number()
                .or_else(|| definition.default.as_f64())
                .map(Value::Number)
                .unwrap_or(Value::Number(0.0)),
        },
        Primitive::Boolean => Value::Boolean(match &value {
            Value::Boolean(b) => *b,
            Value::String(s) => is_enabled(s),
            Value::Number(n) => *n != 0.0,
            other => other.is_truthy(),
        }),
        Primitive::Object => match value {
            Value::Object(_) | Value::Array(_) => value,
            Value::String(s) => match parse_json(&s) {
                Some(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
                _ => Value::empty_object(),
            },
            _ => Value::empty_object(),
        },
        Primitive::Array => match value {
            Value::Array(_) | Value::Object(_) => value,
            Value::String(s) => match parse_json(&s) {
                Some(parsed @ (Value::Array(_) | Value::Object(_))) => parsed,
                _ => split_list(&s),
            },
            Value::Null => Value::Array(Vec::new()),
            other => Value::Array(vec![other]),
        },
    }
}

/// Loop props accept, in order: a native array, an expression yielding an
/// array, a loop preset id or key, a JSON array, a comma separated list
fn loop_source(raw: &Json, value: Value, session: &RenderSession<'_>) -> Value {
    if let Json::Array(_) = raw {
        return value;
    }

    let text = match value {
        Value::Array(_) => return value,
        Value::String(s) => s,
        Value::Number(_) => value.to_string(),
        _ => return Value::Array(Vec::new()),
    };
    let text = text.trim();
    if text.is_empty() {
        return Value::Array(Vec::new());
    }

    let host = session.host();
    let loops = session.renderer().loop_handlers();
    if let Ok(preset) = loops.find_preset(host.environment.as_ref(), text) {
        return match loops.materialize(&preset, &Map::new(), host.data.as_ref()) {
            Ok(items) => Value::Array(items),
            Err(err) => {
                debug!(preset = %preset.id, error = %err, "Loop prop preset failed");
                Value::Array(Vec::new())
            }
        };
    }

    if let Some(parsed @ Value::Array(_)) = parse_json(text) {
        return parsed;
    }

    split_list(text)
}

fn parse_json(source: &str) -> Option<Value> {
    let trimmed = source.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return None;
    }
    serde_json::from_str::<Json>(trimmed).ok().map(Value::from)
}

fn split_list(source: &str) -> Value {
    Value::Array(
        source
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(Value::from)
            .collect(),
    )
}

/// Stringly booleans: `true`, `1`, `yes` and `on`, case-insensitively
pub fn is_enabled(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
