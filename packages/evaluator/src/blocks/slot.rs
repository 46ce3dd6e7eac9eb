use super::BlockRenderer;
use crate::context::RenderSession;
use etch_common::Block;
use tracing::debug;

/// `etch/slot-placeholder`: the call site's content for the slot of the same
/// name, rendered in the call site's scope
pub struct SlotPlaceholderBlock;

impl BlockRenderer for SlotPlaceholderBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let name = block.attr_string("name").unwrap_or_default();
        let Some(content) = session.slot_content(&name) else {
            debug!(slot = %name, "No content for slot");
            return String::new();
        };

        match session.enter_slot() {
            Some(mut scope) => scope.render_blocks(&content),
            None => String::new(),
        }
    }
}

/// `etch/slot-content` is consumed by its component instance. Reached any
/// other way it renders nothing.
pub struct SlotContentBlock;

impl BlockRenderer for SlotContentBlock {
    fn render(&self, _block: &Block, _session: &mut RenderSession<'_>) -> String {
        String::new()
    }
}
