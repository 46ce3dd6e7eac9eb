use super::BlockRenderer;
use crate::context::RenderSession;
use crate::host::Pattern;
use crate::props::{resolve_properties, PropertyDefinition};
use crate::value::Value;
use etch_common::{names, walk_block, Block, Visitor};
use serde_json::Map as JsonMap;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, instrument};

/// `etch/component`: renders a stored pattern with resolved props
pub struct ComponentBlock;

impl BlockRenderer for ComponentBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let Some(reference) = block
            .attr_string("ref")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
        else {
            debug!("Component block without ref");
            return String::new();
        };

        let Some(pattern) = session.host().patterns.find_pattern(&reference) else {
            debug!(pattern = %reference, "Component pattern not found");
            return String::new();
        };

        if pattern.post_type != session.config().pattern_post_type {
            debug!(
                pattern = %reference,
                post_type = %pattern.post_type,
                "Component ref is not a reusable pattern"
            );
            return String::new();
        }

        render_pattern(&pattern, block, session)
    }
}

#[instrument(skip(pattern, block, session), fields(pattern = %pattern.id, depth = session.component_depth()))]
fn render_pattern(pattern: &Pattern, block: &Block, session: &mut RenderSession<'_>) -> String {
    let definitions = PropertyDefinition::parse_list(&pattern.properties);
    let no_attributes = JsonMap::new();
    let attributes = block.attr_object("attributes").unwrap_or(&no_attributes);
    let props = resolve_properties(&definitions, attributes, session);
    debug!(props = props.len(), "Resolved component props");

    let slots = collect_slots(&block.inner_blocks);

    match session.enter_component(pattern.id.clone(), Value::Object(props), slots) {
        Some(mut scope) => scope.render_blocks(&pattern.blocks),
        None => String::new(),
    }
}

/// Finds the first slot content block for each name under an instance.
/// Slot contents of nested component instances belong to those instances.
#[derive(Default)]
struct SlotCollector {
    slots: HashMap<String, Rc<[Block]>>,
}

impl Visitor for SlotCollector {
    fn visit_block(&mut self, block: &Block) {
        if block.is(names::SLOT_CONTENT) {
            if let Some(name) = block.attr_string("name").filter(|name| !name.is_empty()) {
                self.slots
                    .entry(name)
                    .or_insert_with(|| Rc::from(block.inner_blocks.clone()));
            }
            return;
        }
        if block.is(names::COMPONENT) {
            return;
        }
        walk_block(self, block);
    }
}

pub(crate) fn collect_slots(blocks: &[Block]) -> HashMap<String, Rc<[Block]>> {
    let mut collector = SlotCollector::default();
    collector.visit_blocks(blocks);
    collector.slots
}
