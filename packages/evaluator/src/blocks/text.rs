use super::BlockRenderer;
use crate::context::RenderSession;
use etch_common::Block;

/// `etch/text`: resolved `content`, then shortcodes
pub struct TextBlock;

impl BlockRenderer for TextBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let content = match block.attr("content") {
            Some(raw) => session.resolve_json(raw).to_string(),
            None => return String::new(),
        };
        if content.is_empty() {
            return String::new();
        }
        session.host().shortcodes.do_shortcode(&content)
    }
}
