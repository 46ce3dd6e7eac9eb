//! # Etch Block Renderer
//!
//! Renders parsed block trees: resolves `{…}` expressions against the request
//! context, instantiates components with typed props, fills slots from the
//! call site, iterates loops and evaluates conditions.
//!
//! ```rust,ignore
//! use etch_evaluator::{Host, Renderer, StaticEnvironment};
//! use serde_json::json;
//!
//! let renderer = Renderer::new(
//!     Host::builder()
//!         .environment(StaticEnvironment::new().with_post(json!({"title": "Hello"})))
//!         .build(),
//! );
//! let html = renderer.render_json(r#"[{"blockName": "etch/text", "attrs": {"content": "{this.title}"}}]"#)?;
//! assert_eq!(html, "Hello");
//! ```

pub mod blocks;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod host;
mod html;
pub mod loops;
pub mod modifiers;
pub mod props;
pub mod renderer;
pub mod sanitizer;
pub mod shortcodes;
pub mod value;

#[cfg(test)]
mod tests_expressions;

#[cfg(test)]
mod tests_components;

#[cfg(test)]
mod tests_slots;

#[cfg(test)]
mod tests_loops;

#[cfg(test)]
mod tests_conditions;

#[cfg(test)]
mod tests_elements;

pub use blocks::{BlockKind, BlockRenderer, RendererRegistry};
pub use config::{EtchConfig, DEFAULT_CONFIG_NAME};
pub use context::{RenderScope, RenderSession, ScopeGuard};
pub use evaluator::{evaluate, Scope};
pub use host::{
    DataSource, Environment, Host, HostBuilder, HtmlSanitizer, MemoryDataSource,
    MemoryPatternStore, Pattern, PatternStore, ShortcodeEngine, StaticEnvironment,
};
pub use loops::{LoopError, LoopHandler, LoopHandlerManager, LoopPreset, LoopResult, LoopType};
pub use props::{resolve_properties, DefinitionError, Primitive, PropertyDefinition, Specialized};
pub use renderer::Renderer;
pub use sanitizer::{AllowListSanitizer, SanitizerPolicy};
pub use shortcodes::{ShortcodeAttributes, ShortcodeRegistry};
pub use value::{Map, Value};
