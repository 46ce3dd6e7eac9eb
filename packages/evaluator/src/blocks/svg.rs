use super::{is_safe_attribute_name, BlockRenderer};
use crate::context::RenderSession;
use crate::html::{self, attribute_name, escape_attribute, escape_text, is_html_element};
use crate::props::is_enabled;
use crate::value::Value;
use etch_common::Block;
use lazy_static::lazy_static;
use markup5ever::{Attribute, QualName};
use markup5ever_rcdom::{Handle, NodeData};
use regex::{Captures, Regex};
use serde_json::Map as JsonMap;
use tracing::{debug, warn};

lazy_static! {
    static ref COLOR_DECLARATION: Regex =
        Regex::new(r"(?i)(^|[;\s{])(fill|stroke)\s*:\s*([^;}]+)").unwrap();
}

const CURRENT_COLOR: &str = "currentColor";

/// Attributes consumed by the block itself
const RESERVED: &[&str] = &["src", "stripColors", "tag"];

/// `etch/svg`: inline SVG markup loaded from `attributes.src`
pub struct SvgBlock;

impl BlockRenderer for SvgBlock {
    fn render(&self, block: &Block, session: &mut RenderSession<'_>) -> String {
        let no_attributes = JsonMap::new();
        let attributes = block.attr_object("attributes").unwrap_or(&no_attributes);

        let src = attributes
            .get("src")
            .map(|raw| session.resolve_json(raw).to_string())
            .unwrap_or_default();

        let strip_colors = match attributes.get("stripColors").map(|raw| session.resolve_json(raw)) {
            Some(Value::String(s)) => is_enabled(&s),
            Some(value) => value.is_truthy(),
            None => false,
        };

        let shortcodes = &session.host().shortcodes;
        let overrides: Vec<(String, String)> = attributes
            .iter()
            .filter(|(name, _)| !RESERVED.contains(&name.as_str()))
            .filter(|(name, _)| is_safe_attribute_name(name))
            .filter_map(|(name, raw)| match session.resolve_json(raw) {
                Value::Null => None,
                value => Some((name.clone(), shortcodes.do_shortcode(&value.to_string()))),
            })
            .collect();

        let loaded = load_markup(src.trim(), session);
        if let Some(svg) = loaded
            .as_deref()
            .and_then(|markup| render_svg(markup, &overrides, strip_colors))
        {
            return svg;
        }
        if loaded.is_some() {
            warn!(src = %src, "Asset is not SVG markup, using fallback");
        }

        let fallback = &session.config().fallback_svg;
        render_svg(fallback, &overrides, strip_colors).unwrap_or_else(|| fallback.clone())
    }
}

fn load_markup(src: &str, session: &RenderSession<'_>) -> Option<String> {
    if src.is_empty() {
        debug!("SVG block without src, using fallback");
        return None;
    }
    if src.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("<svg")) {
        return Some(src.to_string());
    }

    match session.host().assets.load(src) {
        Ok(markup) => Some(markup),
        Err(err) => {
            warn!(src, error = %err, "SVG could not be loaded, using fallback");
            None
        }
    }
}

/// Serialize the first `<svg>` element of `markup`, block attributes taking
/// precedence over native ones (matched case-insensitively). Anything around
/// that element, such as an XML prolog or comments, is dropped. `None` when
/// the markup holds no `<svg>` element.
pub fn render_svg(markup: &str, overrides: &[(String, String)], strip_colors: bool) -> Option<String> {
    let dom = html::parse(markup);
    let root = html::find_element(&dom.document, "svg")?;
    let NodeData::Element { name, attrs, .. } = &root.data else {
        return None;
    };

    let mut writer = SvgWriter {
        strip_colors,
        out: String::with_capacity(markup.len()),
    };
    let mut attributes = writer.attributes(&attrs.borrow());
    for (name, value) in overrides {
        match attributes
            .iter_mut()
            .find(|(native, _)| native.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.1 = value.clone(),
            None => attributes.push((name.clone(), value.clone())),
        }
    }

    writer.write_element(&root, name, &attributes);
    Some(writer.out)
}

/// `fill` and `stroke` declarations become `currentColor`; `none` is kept
pub fn strip_color_declarations(css: &str) -> String {
    COLOR_DECLARATION
        .replace_all(css, |caps: &Captures<'_>| {
            if caps[3].trim().eq_ignore_ascii_case("none") {
                caps[0].to_string()
            } else {
                format!("{}{}: {}", &caps[1], &caps[2], CURRENT_COLOR)
            }
        })
        .into_owned()
}

fn strip_color(name: &str, value: &str) -> String {
    if name.eq_ignore_ascii_case("fill") || name.eq_ignore_ascii_case("stroke") {
        if value.trim().eq_ignore_ascii_case("none") {
            value.to_string()
        } else {
            CURRENT_COLOR.to_string()
        }
    } else if name.eq_ignore_ascii_case("style") {
        strip_color_declarations(value)
    } else {
        value.to_string()
    }
}

/// Writes SVG back out of the parsed DOM. Childless SVG elements self-close.
struct SvgWriter {
    strip_colors: bool,
    out: String,
}

impl SvgWriter {
    fn attributes(&self, attrs: &[Attribute]) -> Vec<(String, String)> {
        attrs
            .iter()
            .map(|attribute| {
                let name = attribute_name(attribute);
                let value = if self.strip_colors {
                    strip_color(&name, &attribute.value)
                } else {
                    attribute.value.to_string()
                };
                (name, value)
            })
            .collect()
    }

    fn write_children(&mut self, handle: &Handle) {
        for child in handle.children.borrow().iter() {
            self.write_node(child);
        }
    }

    fn write_node(&mut self, handle: &Handle) {
        match &handle.data {
            NodeData::Text { contents } => self.out.push_str(&escape_text(&contents.borrow())),
            NodeData::Element { name, attrs, .. } => {
                let attributes = self.attributes(&attrs.borrow());
                self.write_element(handle, name, &attributes);
            }
            _ => {}
        }
    }

    fn write_element(&mut self, handle: &Handle, name: &QualName, attributes: &[(String, String)]) {
        let tag: &str = &name.local;
        self.out.push('<');
        self.out.push_str(tag);
        for (attr_name, value) in attributes {
            self.out
                .push_str(&format!(" {}=\"{}\"", attr_name, escape_attribute(value)));
        }

        if is_html_element(name) {
            self.out.push('>');
            if html::VOID_ELEMENTS.contains(&tag) {
                return;
            }
            self.write_children(handle);
        } else if handle.children.borrow().is_empty() {
            self.out.push_str("/>");
            return;
        } else if tag == "style" {
            self.out.push('>');
            let css = html::raw_text(handle);
            let css = if self.strip_colors {
                strip_color_declarations(&css)
            } else {
                css
            };
            self.out.push_str(&escape_text(&css));
        } else {
            self.out.push('>');
            self.write_children(handle);
        }

        self.out.push_str(&format!("</{}>", tag));
    }
}
