use crate::block::Block;

/// Visitor pattern for traversing block trees immutably
///
/// The default implementations walk the entire tree. Override `visit_block`
/// and decide per node whether to call `walk_block` to descend.
pub trait Visitor: Sized {
    fn visit_blocks(&mut self, blocks: &[Block]) {
        walk_blocks(self, blocks);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }
}

pub fn walk_blocks<V: Visitor>(visitor: &mut V, blocks: &[Block]) {
    for block in blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    visitor.visit_blocks(&block.inner_blocks);
}
