use crate::sanitizer::SanitizerPolicy;
use etch_common::CommonResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "etch.config.json";

const DEFAULT_FALLBACK_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><rect x="3" y="3" width="18" height="18" rx="2" fill="none" stroke="currentColor" stroke-width="2"/><path d="M3 16l5-5 4 4 3-3 6 6" fill="none" stroke="currentColor" stroke-width="2"/></svg>"#;

/// Renderer configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtchConfig {
    /// Post type a component `ref` must point at
    #[serde(default = "default_pattern_post_type")]
    pub pattern_post_type: String,

    /// Stored option holding the loop preset table
    #[serde(default = "default_loop_option_name")]
    pub loop_option_name: String,

    /// Nesting limit for component instances
    #[serde(default = "default_max_component_depth")]
    pub max_component_depth: usize,

    #[serde(default = "default_item_id")]
    pub default_item_id: String,

    #[serde(default = "default_index_id")]
    pub default_index_id: String,

    /// Markup rendered when an SVG source cannot be loaded
    #[serde(default = "default_fallback_svg")]
    pub fallback_svg: String,

    #[serde(default)]
    pub sanitizer: SanitizerPolicy,
}

fn default_pattern_post_type() -> String {
    "wp_block".to_string()
}

fn default_loop_option_name() -> String {
    "etch_loops".to_string()
}

fn default_max_component_depth() -> usize {
    16
}

fn default_item_id() -> String {
    "item".to_string()
}

fn default_index_id() -> String {
    "index".to_string()
}

fn default_fallback_svg() -> String {
    DEFAULT_FALLBACK_SVG.to_string()
}

impl EtchConfig {
    /// Load config from a directory; a missing file yields the defaults
    pub fn load(dir: impl AsRef<Path>) -> CommonResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json_str(content: &str) -> CommonResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl Default for EtchConfig {
    fn default() -> Self {
        Self {
            pattern_post_type: default_pattern_post_type(),
            loop_option_name: default_loop_option_name(),
            max_component_depth: default_max_component_depth(),
            default_item_id: default_item_id(),
            default_index_id: default_index_id(),
            fallback_svg: default_fallback_svg(),
            sanitizer: SanitizerPolicy::default(),
        }
    }
}
