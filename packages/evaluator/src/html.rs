//! HTML parsing and serialization helpers shared by the sanitizer and the
//! SVG block.
//!
//! Markup goes through `html5ever`, so entities, quoting and malformed tags
//! are read the way a browser reads them before anything inspects them.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever::{Attribute, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Their text children are written without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Parse markup as a document. Fragments land under the implied `<body>`,
/// leading metadata elements under `<head>`.
pub fn parse(markup: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(markup)
}

pub fn is_html_element(name: &QualName) -> bool {
    &*name.ns == HTML_NAMESPACE
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// `prefix:local` for namespaced attributes such as `xlink:href`
pub fn attribute_name(attribute: &Attribute) -> String {
    match &attribute.name.prefix {
        Some(prefix) => format!("{}:{}", prefix, attribute.name.local),
        None => attribute.name.local.to_string(),
    }
}

/// First element named `local` in document order
pub fn find_element(handle: &Handle, local: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == local {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, local))
}

/// Concatenated text children, unescaped
pub fn raw_text(handle: &Handle) -> String {
    let mut text = String::new();
    for child in handle.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
