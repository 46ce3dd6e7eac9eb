//! Parsed block tree as produced by the host block parser.
//!
//! The shape mirrors the JSON emitted by `parse_blocks`: every node carries a
//! name, a loose attribute mapping, nested blocks and the raw HTML chunks that
//! surround them.

use crate::result::CommonResult;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

/// Block names understood by the renderer
pub mod names {
    pub const COMPONENT: &str = "etch/component";
    pub const CONDITION: &str = "etch/condition";
    pub const LOOP: &str = "etch/loop";
    pub const ELEMENT: &str = "etch/element";
    pub const DYNAMIC_ELEMENT: &str = "etch/dynamic-element";
    pub const TEXT: &str = "etch/text";
    pub const RAW_HTML: &str = "etch/raw-html";
    pub const SVG: &str = "etch/svg";
    pub const SLOT_CONTENT: &str = "etch/slot-content";
    pub const SLOT_PLACEHOLDER: &str = "etch/slot-placeholder";
}

/// A single node of a parsed block tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub block_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_attrs")]
    pub attrs: Map<String, Json>,

    #[serde(default)]
    pub inner_blocks: Vec<Block>,

    #[serde(default, rename = "innerHTML")]
    pub inner_html: String,

    /// HTML chunks interleaved with `None` markers for each inner block
    #[serde(default)]
    pub inner_content: Vec<Option<String>>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            block_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Parse a single block from its JSON representation
    pub fn from_json(value: Json) -> CommonResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a list of blocks, as returned by `parse_blocks`
    pub fn list_from_str(source: &str) -> CommonResult<Vec<Self>> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_inner_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.inner_blocks = blocks;
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        let html = html.into();
        self.inner_content = vec![Some(html.clone())];
        self.inner_html = html;
        self
    }

    /// Block name, or the empty string for freeform HTML chunks
    pub fn name(&self) -> &str {
        self.block_name.as_deref().unwrap_or("")
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name
    }

    pub fn attr(&self, key: &str) -> Option<&Json> {
        self.attrs.get(key).filter(|value| !value.is_null())
    }

    /// Attribute as a string. Numbers are stringified so ids stored as
    /// integers and as strings look the same.
    pub fn attr_string(&self, key: &str) -> Option<String> {
        match self.attr(key)? {
            Json::String(s) => Some(s.clone()),
            Json::Number(n) => Some(n.to_string()),
            Json::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn attr_object(&self, key: &str) -> Option<&Map<String, Json>> {
        self.attr(key).and_then(Json::as_object)
    }
}

/// The host serializes empty attribute sets as `[]`.
fn deserialize_attrs<'de, D>(deserializer: D) -> Result<Map<String, Json>, D::Error>
where
    D: Deserializer<'de>,
{
    match Json::deserialize(deserializer)? {
        Json::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}
