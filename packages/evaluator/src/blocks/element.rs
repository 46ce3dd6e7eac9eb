use super::{render_inner, BlockRenderer};
use crate::context::RenderSession;
use crate::html::{escape_attribute, VOID_ELEMENTS};
use crate::value::Value;
use etch_common::Block;
use tracing::debug;

const FALLBACK_TAG: &str = "div";

/// `etch/element` and `etch/dynamic-element`.
///
/// A dynamic element takes its tag from `attributes.tag` when present,
/// falling back to the block's `tag`. `tag` is never rendered as an
/// attribute.
pub struct ElementBlock {
    pub dynamic: bool,
}

impl ElementBlock {
    fn tag(&self, block: &Block, session: &RenderSession<'_>) -> String {
        let dynamic_tag = if self.dynamic {
            block
                .attr_object("attributes")
                .and_then(|attributes| attributes.get("tag"))
                .map(|raw| session.resolve_json(raw))
                .filter(|tag| !tag.is_empty())
        } else {
            None
        };

        let tag = dynamic_tag
            .or_else(|| block.attr("tag").map(|raw| session.resolve_json(raw)))
            .map(|tag| tag.to_string().trim().to_string())
            .unwrap_or_default();

        if is_safe_tag(&tag) {
            tag
        } else {
            if !tag.is_empty() {
                debug!(tag = %tag, "Unsafe element tag replaced");
            }
            FALLBACK_TAG.to_string()
        }
    }
}

impl BlockRenderer for ElementBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let tag = self.tag(block, session);

        let mut output = format!("<{}", tag);
        if let Some(attributes) = block.attr_object("attributes") {
            for (name, raw) in attributes {
                if name == "tag" {
                    continue;
                }
                if !is_safe_attribute_name(name) {
                    debug!(attribute = %name, "Unsafe attribute name dropped");
                    continue;
                }
                match session.resolve_json(raw) {
                    Value::Null => {}
                    value => {
                        output.push_str(&format!(" {}=\"{}\"", name, escape_attribute(&value.to_string())));
                    }
                }
            }
        }
        output.push('>');

        if VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()) {
            return output;
        }

        output.push_str(&render_inner(block, session));
        output.push_str(&format!("</{}>", tag));
        output
    }
}

/// `^[A-Za-z][A-Za-z0-9-]*$`
pub fn is_safe_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `^[A-Za-z_:@][A-Za-z0-9_:.@-]*$`
pub fn is_safe_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || matches!(c, '_' | ':' | '@'))
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '@' | '-'))
}
