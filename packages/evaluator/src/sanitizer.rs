//! Allow-list HTML sanitizer used for `etch/raw-html` content that is not
//! marked unsafe.
//!
//! Content is parsed with `html5ever` and re-serialized from the DOM, so
//! attribute values are checked after entity decoding.

use crate::host::HtmlSanitizer;
use crate::html::{
    self, attribute_name, escape_attribute, escape_text, is_html_element, is_raw_text_element,
};
use markup5ever_rcdom::{Handle, NodeData};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "xlink:href", "poster", "cite"];
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Added by the document parser around every fragment
const DOCUMENT_WRAPPERS: &[&str] = &["html", "head", "body"];

/// Which tags and attributes survive sanitization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizerPolicy {
    pub allowed_tags: Vec<String>,
    pub allowed_attributes: Vec<String>,
    pub allow_data_attributes: bool,
    pub allow_aria_attributes: bool,
    /// Removed together with everything between their open and close tags
    pub stripped_elements: Vec<String>,
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        let tags = [
            "a", "abbr", "address", "article", "aside", "b", "blockquote", "br", "caption",
            "cite", "code", "col", "colgroup", "dd", "del", "details", "div", "dl", "dt", "em",
            "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
            "i", "img", "ins", "kbd", "li", "main", "mark", "nav", "ol", "p", "picture", "pre",
            "q", "s", "section", "small", "source", "span", "strong", "sub", "summary", "sup",
            "table", "tbody", "td", "tfoot", "th", "thead", "time", "tr", "u", "ul", "video",
            "audio", "track",
        ];
        let attributes = [
            "alt", "class", "colspan", "controls", "datetime", "height", "href", "id", "lang",
            "loading", "name", "rel", "role", "rowspan", "sizes", "src", "srcset", "style",
            "target", "title", "type", "width",
        ];
        let stripped = [
            "script", "style", "iframe", "object", "embed", "noscript", "template", "form",
        ];

        Self {
            allowed_tags: tags.iter().map(|t| t.to_string()).collect(),
            allowed_attributes: attributes.iter().map(|a| a.to_string()).collect(),
            allow_data_attributes: true,
            allow_aria_attributes: true,
            stripped_elements: stripped.iter().map(|t| t.to_string()).collect(),
        }
    }
}

pub struct AllowListSanitizer {
    tags: HashSet<String>,
    attributes: HashSet<String>,
    allow_data: bool,
    allow_aria: bool,
    stripped: HashSet<String>,
}

impl AllowListSanitizer {
    pub fn new(policy: &SanitizerPolicy) -> Self {
        Self {
            tags: lowercase_set(&policy.allowed_tags),
            attributes: lowercase_set(&policy.allowed_attributes),
            allow_data: policy.allow_data_attributes,
            allow_aria: policy.allow_aria_attributes,
            stripped: lowercase_set(&policy.stripped_elements),
        }
    }

    fn attribute_allowed(&self, name: &str) -> bool {
        if name.starts_with("on") {
            return false;
        }
        self.attributes.contains(name)
            || (self.allow_data && name.starts_with("data-"))
            || (self.allow_aria && name.starts_with("aria-"))
    }

    fn write_children(&self, handle: &Handle, out: &mut String) {
        for child in handle.children.borrow().iter() {
            self.write_node(child, out);
        }
    }

    /// Comments, doctypes and processing instructions are dropped
    fn write_node(&self, handle: &Handle, out: &mut String) {
        match &handle.data {
            NodeData::Document => self.write_children(handle, out),
            NodeData::Text { contents } => out.push_str(&escape_text(&contents.borrow())),
            NodeData::Element { name, attrs, .. } => {
                let tag = (*name.local).to_ascii_lowercase();
                if is_html_element(name) && DOCUMENT_WRAPPERS.contains(&tag.as_str()) {
                    self.write_children(handle, out);
                    return;
                }
                if self.stripped.contains(&tag) {
                    return;
                }
                if !self.tags.contains(&tag) {
                    self.write_children(handle, out);
                    return;
                }

                out.push('<');
                out.push_str(&tag);
                for attribute in attrs.borrow().iter() {
                    let attr_name = attribute_name(attribute).to_ascii_lowercase();
                    if !self.attribute_allowed(&attr_name) {
                        continue;
                    }
                    if URL_ATTRIBUTES.contains(&attr_name.as_str()) && is_blocked_url(&attribute.value) {
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", attr_name, escape_attribute(&attribute.value)));
                }
                out.push('>');

                if html::VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                if is_raw_text_element(&tag) {
                    out.push_str(&html::raw_text(handle));
                } else {
                    self.write_children(handle, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
            _ => {}
        }
    }
}

impl Default for AllowListSanitizer {
    fn default() -> Self {
        Self::new(&SanitizerPolicy::default())
    }
}

impl HtmlSanitizer for AllowListSanitizer {
    fn sanitize(&self, markup: &str) -> String {
        let dom = html::parse(markup);
        let mut out = String::with_capacity(markup.len());
        self.write_node(&dom.document, &mut out);
        out
    }
}

fn lowercase_set(items: &[String]) -> HashSet<String> {
    items.iter().map(|item| item.to_ascii_lowercase()).collect()
}

/// `javascript:`, `vbscript:` and `data:` URLs, including obfuscated
/// spellings with embedded whitespace or control characters. Expects the
/// entity-decoded value.
fn is_blocked_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}
