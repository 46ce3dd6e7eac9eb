//! Element, dynamic element and SVG output
use crate::host::{Host, MemoryPatternStore, Pattern, StaticEnvironment};
use crate::renderer::Renderer;
use crate::shortcodes::ShortcodeRegistry;
use etch_common::{names, Block, MemoryAssetLoader};
use serde_json::{json, Value as Json};

const ICON: &str = r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" class="native" fill="#222"><path stroke="red" d="M0 0h24"/></svg>"##;

fn renderer() -> Renderer {
    let mut assets = MemoryAssetLoader::new();
    assets.add_asset("/icons/star.svg", ICON);

    let heading = Pattern::new(
        "heading",
        vec![Block::new(names::DYNAMIC_ELEMENT)
            .with_attr("tag", "h2")
            .with_attr("attributes", json!({"tag": "{props.level}", "class": "title"}))
            .with_inner_blocks(vec![Block::new(names::TEXT).with_attr("content", "{props.text}")])],
    )
    .with_properties(json!([
        {"key": "level", "type": {"primitive": "string"}, "default": "h2"},
        {"key": "text", "type": {"primitive": "string"}, "default": "Heading"}
    ]));

    Renderer::new(
        Host::builder()
            .environment(StaticEnvironment::new().with_post(json!({
                "title": "Post",
                "slug": "a&b",
                "image": "/img/cover.jpg"
            })))
            .patterns(MemoryPatternStore::new().with_pattern(heading))
            .shortcodes(ShortcodeRegistry::new().with("site_name", |_, _| "Etch".to_string()))
            .assets(assets)
            .build(),
    )
}

fn element(tag: impl Into<Json>, attributes: Json, children: Vec<Block>) -> Block {
    Block::new(names::ELEMENT)
        .with_attr("tag", tag)
        .with_attr("attributes", attributes)
        .with_inner_blocks(children)
}

fn svg(attributes: Json) -> Block {
    Block::new(names::SVG).with_attr("attributes", attributes)
}

#[test]
fn test_element_attributes_are_resolved_and_escaped() {
    let output = renderer().render(&[element(
        "a",
        json!({"href": "/posts/{this.slug}", "title": "\"{this.title}\"", "data-x": null}),
        vec![Block::new(names::TEXT).with_attr("content", "{this.title}")],
    )]);
    assert_eq!(
        output,
        r#"<a href="/posts/a&amp;b" title="&quot;Post&quot;">Post</a>"#
    );
}

#[test]
fn test_unsafe_tags_and_attribute_names() {
    let output = renderer().render(&[element(
        "div onclick=alert(1)",
        json!({"on click": "x", "class": "ok", "tag": "span"}),
        vec![],
    )]);
    assert_eq!(output, r#"<div class="ok"></div>"#);
}

#[test]
fn test_missing_tag_falls_back_to_div() {
    let output = renderer().render(&[Block::new(names::ELEMENT)]);
    assert_eq!(output, "<div></div>");
}

#[test]
fn test_void_elements() {
    let output = renderer().render(&[element(
        "img",
        json!({"src": "{this.image}", "alt": ""}),
        vec![Block::new(names::TEXT).with_attr("content", "ignored")],
    )]);
    assert_eq!(output, r#"<img src="/img/cover.jpg" alt="">"#);
}

#[test]
fn test_dynamic_element_tag_from_props() {
    let renderer = renderer();
    let heading = |attributes: Json| {
        Block::new(names::COMPONENT)
            .with_attr("ref", "heading")
            .with_attr("attributes", attributes)
    };

    assert_eq!(
        renderer.render(&[heading(json!({}))]),
        r#"<h2 class="title">Heading</h2>"#
    );
    assert_eq!(
        renderer.render(&[heading(json!({"level": "h4", "text": "Small"}))]),
        r#"<h4 class="title">Small</h4>"#
    );
    assert_eq!(
        renderer.render(&[heading(json!({"level": "<script>"}))]),
        r#"<div class="title">Heading</div>"#
    );
}

#[test]
fn test_dynamic_element_falls_back_to_block_tag() {
    let block = Block::new(names::DYNAMIC_ELEMENT)
        .with_attr("tag", "section")
        .with_attr("attributes", json!({"tag": "{this.missing}", "id": "main"}));
    assert_eq!(renderer().render(&[block]), r#"<section id="main"></section>"#);
}

#[test]
fn test_svg_merges_attributes_onto_root() {
    let output = renderer().render(&[svg(json!({
        "src": "/icons/star.svg",
        "class": "icon",
        "aria-label": "[site_name] {this.title}"
    }))]);
    assert_eq!(
        output,
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" class="icon" fill="#222" aria-label="Etch Post"><path stroke="red" d="M0 0h24"/></svg>"##
    );
    assert!(!output.contains("src="));
}

#[test]
fn test_svg_strip_colors() {
    let output = renderer().render(&[svg(json!({"src": "/icons/star.svg", "stripColors": "true"}))]);
    assert!(output.contains(r#"fill="currentColor""#));
    assert!(output.contains(r#"stroke="currentColor""#));
    assert!(!output.contains("red"));
    assert!(!output.contains("stripColors"));
}

#[test]
fn test_svg_fallback_on_missing_source() {
    let renderer = renderer();
    let fallback = renderer.config().fallback_svg.clone();

    assert_eq!(renderer.render(&[svg(json!({}))]), fallback);
    assert_eq!(renderer.render(&[svg(json!({"src": "/icons/none.svg"}))]), fallback);
}

#[test]
fn test_svg_inline_source() {
    let output = renderer().render(&[svg(json!({"src": "<svg><circle r=\"1\"/></svg>", "id": "dot"}))]);
    assert_eq!(output, r#"<svg id="dot"><circle r="1"/></svg>"#);
}
