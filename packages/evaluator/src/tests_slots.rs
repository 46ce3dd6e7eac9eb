//! Slot placeholders and slot content scoping
use crate::host::{Host, MemoryPatternStore, Pattern, StaticEnvironment};
use crate::renderer::Renderer;
use etch_common::{names, Block};
use serde_json::{json, Value as Json};

fn text(content: &str) -> Block {
    Block::new(names::TEXT).with_attr("content", content)
}

fn div(children: Vec<Block>) -> Block {
    Block::new(names::ELEMENT)
        .with_attr("tag", "div")
        .with_inner_blocks(children)
}

fn placeholder(name: &str) -> Block {
    Block::new(names::SLOT_PLACEHOLDER).with_attr("name", name)
}

fn slot(name: &str, children: Vec<Block>) -> Block {
    Block::new(names::SLOT_CONTENT)
        .with_attr("name", name)
        .with_inner_blocks(children)
}

fn instance(reference: &str, attributes: Json, children: Vec<Block>) -> Block {
    Block::new(names::COMPONENT)
        .with_attr("ref", reference)
        .with_attr("attributes", attributes)
        .with_inner_blocks(children)
}

fn title_prop(default: &str) -> Json {
    json!([{"key": "title", "type": {"primitive": "string"}, "default": default}])
}

/// `card` wraps its `body` slot in a div
fn renderer(extra: Vec<Pattern>) -> Renderer {
    let mut store = MemoryPatternStore::new()
        .with_pattern(Pattern::new("card", vec![div(vec![placeholder("body")])]).with_properties(title_prop("Card")));
    for pattern in extra {
        store.add_pattern(pattern);
    }
    Renderer::new(
        Host::builder()
            .environment(StaticEnvironment::new().with_post(json!({"title": "Post"})))
            .patterns(store)
            .build(),
    )
}

#[test]
fn test_slot_content_renders_in_placeholder() {
    let renderer = renderer(vec![]);
    let output = renderer.render(&[instance(
        "card",
        json!({"title": "Inner"}),
        vec![slot("body", vec![text("[{props.title}|{this.title}]")])],
    )]);
    // No caller component at the top level, so props are empty
    assert_eq!(output, "<div>[|Post]</div>");
}

#[test]
fn test_slot_content_uses_caller_props() {
    let page = Pattern::new(
        "page",
        vec![instance(
            "card",
            json!({"title": "Inner"}),
            vec![slot("body", vec![text("{props.title}")])],
        )],
    )
    .with_properties(title_prop("Outer"));

    let renderer = renderer(vec![page]);
    assert_eq!(
        renderer.render(&[instance("page", json!({}), vec![])]),
        "<div>Outer</div>"
    );
}

#[test]
fn test_slot_matching_rules() {
    let two_slots = Pattern::new(
        "two",
        vec![placeholder("Body"), text("|"), placeholder(""), text("|"), placeholder("body")],
    );
    let renderer = renderer(vec![two_slots]);

    let output = renderer.render(&[instance(
        "two",
        json!({}),
        vec![
            slot("body", vec![text("first")]),
            slot("body", vec![text("second")]),
            slot("", vec![text("unnamed")]),
        ],
    )]);
    assert_eq!(output, "||first");
}

#[test]
fn test_missing_slot_content_renders_empty() {
    let renderer = renderer(vec![]);
    assert_eq!(
        renderer.render(&[instance("card", json!({}), vec![])]),
        "<div></div>"
    );
}

#[test]
fn test_component_inside_slot_has_own_props() {
    let renderer = renderer(vec![Pattern::new("label", vec![text("<{props.title}>")])
        .with_properties(title_prop("Label"))]);

    let output = renderer.render(&[instance(
        "card",
        json!({"title": "Card title"}),
        vec![slot(
            "body",
            vec![instance("label", json!({"title": "In slot"}), vec![]), text("{props.title}")],
        )],
    )]);
    assert_eq!(output, "<div><In slot></div>");
}

#[test]
fn test_slot_forwarded_through_nested_components() {
    // `frame` passes its own `body` slot into the card it renders
    let frame = Pattern::new(
        "frame",
        vec![instance(
            "card",
            json!({"title": "card"}),
            vec![slot("body", vec![placeholder("body")])],
        )],
    )
    .with_properties(title_prop("frame"));
    let page = Pattern::new(
        "page",
        vec![instance(
            "frame",
            json!({}),
            vec![slot("body", vec![text("{props.title}")])],
        )],
    )
    .with_properties(title_prop("page"));

    let renderer = renderer(vec![frame, page]);
    assert_eq!(
        renderer.render(&[instance("page", json!({}), vec![])]),
        "<div>page</div>"
    );
}

#[test]
fn test_slot_content_sees_call_site_loop_item() {
    let renderer = renderer(vec![]);
    let looped = Block::new(names::LOOP)
        .with_attr("target", json!(["a", "b"]))
        .with_inner_blocks(vec![instance(
            "card",
            json!({}),
            vec![slot("body", vec![text("{item}{index}")])],
        )]);

    assert_eq!(renderer.render(&[looped]), "<div>a0</div><div>b1</div>");
}

#[test]
fn test_scope_restored_after_slot() {
    let pattern = Pattern::new("after", vec![placeholder("body"), text("|{props.title}")])
        .with_properties(title_prop("Inner"));
    let renderer = renderer(vec![pattern]);

    let output = renderer.render(&[instance(
        "after",
        json!({}),
        vec![slot("body", vec![text("[{props.title}]")])],
    )]);
    assert_eq!(output, "[]|Inner");
}

#[test]
fn test_slot_content_outside_component_renders_nothing() {
    let renderer = renderer(vec![]);
    assert_eq!(
        renderer.render(&[slot("body", vec![text("hidden")]), placeholder("body")]),
        ""
    );
}
