//! Block renderers, one per `etch/*` block kind.
//!
//! Dispatch goes through a [`RendererRegistry`] keyed by [`BlockKind`]. Block
//! names outside the closed set render through [`PassthroughBlock`], which
//! re-emits the stored HTML around the rendered inner blocks.

mod component;
mod condition;
mod element;
mod loop_block;
mod raw_html;
mod slot;
mod svg;
mod text;

pub use component::ComponentBlock;
pub use condition::{evaluate_condition, ConditionBlock};
pub use crate::html::escape_attribute;
pub use element::{is_safe_attribute_name, is_safe_tag, ElementBlock};
pub use loop_block::LoopBlock;
pub use raw_html::RawHtmlBlock;
pub use slot::{SlotContentBlock, SlotPlaceholderBlock};
pub use svg::SvgBlock;
pub use text::TextBlock;

use crate::context::RenderSession;
use etch_common::{names, Block};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Component,
    Condition,
    Loop,
    Element,
    DynamicElement,
    Text,
    RawHtml,
    Svg,
    SlotContent,
    SlotPlaceholder,
    Passthrough,
}

impl BlockKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            names::COMPONENT => BlockKind::Component,
            names::CONDITION => BlockKind::Condition,
            names::LOOP => BlockKind::Loop,
            names::ELEMENT => BlockKind::Element,
            names::DYNAMIC_ELEMENT => BlockKind::DynamicElement,
            names::TEXT => BlockKind::Text,
            names::RAW_HTML => BlockKind::RawHtml,
            names::SVG => BlockKind::Svg,
            names::SLOT_CONTENT => BlockKind::SlotContent,
            names::SLOT_PLACEHOLDER => BlockKind::SlotPlaceholder,
            _ => BlockKind::Passthrough,
        }
    }
}

/// Renders one block in the session's current scope
pub trait BlockRenderer {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String;
}

pub struct RendererRegistry {
    renderers: HashMap<BlockKind, Box<dyn BlockRenderer>>,
    passthrough: PassthroughBlock,
}

impl RendererRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
            passthrough: PassthroughBlock,
        };
        registry.register(BlockKind::Component, ComponentBlock);
        registry.register(BlockKind::Condition, ConditionBlock);
        registry.register(BlockKind::Loop, LoopBlock);
        registry.register(BlockKind::Element, ElementBlock { dynamic: false });
        registry.register(BlockKind::DynamicElement, ElementBlock { dynamic: true });
        registry.register(BlockKind::Text, TextBlock);
        registry.register(BlockKind::RawHtml, RawHtmlBlock);
        registry.register(BlockKind::Svg, SvgBlock);
        registry.register(BlockKind::SlotContent, SlotContentBlock);
        registry.register(BlockKind::SlotPlaceholder, SlotPlaceholderBlock);
        registry
    }

    pub fn register(&mut self, kind: BlockKind, renderer: impl BlockRenderer + 'static) {
        self.renderers.insert(kind, Box::new(renderer));
    }

    pub fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        match self.renderers.get(&BlockKind::from_name(block.name())) {
            Some(renderer) => renderer.render(block, session),
            None => self.passthrough.render(block, session),
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Core and freeform blocks: stored HTML with inner blocks rendered into
/// their `innerContent` positions
pub struct PassthroughBlock;

impl BlockRenderer for PassthroughBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        render_inner(block, session)
    }
}

/// Render a block's inner content. `None` entries of `innerContent` are
/// replaced by the next inner block; without `innerContent`, the stored
/// `innerHTML` is followed by every inner block.
pub fn render_inner(block: &Block, session: &mut RenderSession<'_>) -> String {
    let mut output = String::new();

    if block.inner_content.is_empty() {
        output.push_str(&block.inner_html);
        output.push_str(&session.render_blocks(&block.inner_blocks));
        return output;
    }

    let mut children = block.inner_blocks.iter();
    for chunk in &block.inner_content {
        match chunk {
            Some(html) => output.push_str(html),
            None => {
                if let Some(child) = children.next() {
                    output.push_str(&session.render_block(child));
                }
            }
        }
    }
    output
}
