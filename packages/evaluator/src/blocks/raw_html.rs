use super::BlockRenderer;
use crate::context::RenderSession;
use crate::props::is_enabled;
use crate::value::Value;
use etch_common::Block;
use tracing::debug;

/// `etch/raw-html`: resolved HTML, sanitized and shortcode-expanded unless
/// flagged `unsafe`
pub struct RawHtmlBlock;

impl RawHtmlBlock {
    fn is_unsafe(block: &Block, session: &RenderSession<'_>) -> bool {
        match block.attr("unsafe").map(|raw| session.resolve_json(raw)) {
            Some(Value::String(s)) => is_enabled(&s),
            Some(value) => value.is_truthy(),
            None => false,
        }
    }
}

impl BlockRenderer for RawHtmlBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let content = block
            .attr("content")
            .map(|raw| session.resolve_json(raw).to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return String::new();
        }

        if Self::is_unsafe(block, session) {
            debug!("Raw HTML rendered without sanitizing");
            return content;
        }

        let sanitized = session.renderer().sanitizer().sanitize(&content);
        session.host().shortcodes.do_shortcode(&sanitized)
    }
}
