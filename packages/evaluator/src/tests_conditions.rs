//! Condition blocks inside components and loops
use crate::host::{Host, MemoryPatternStore, Pattern, StaticEnvironment};
use crate::renderer::Renderer;
use etch_common::{names, Block};
use serde_json::{json, Value as Json};

fn text(content: &str) -> Block {
    Block::new(names::TEXT).with_attr("content", content)
}

fn condition(condition: Json, children: Vec<Block>) -> Block {
    Block::new(names::CONDITION)
        .with_attr("condition", condition)
        .with_inner_blocks(children)
}

fn renderer() -> Renderer {
    let badge = Pattern::new(
        "badge",
        vec![condition(
            json!({"leftHand": "{props.show}", "operator": "isTruthy"}),
            vec![text("{props.label}")],
        )],
    )
    .with_properties(json!([
        {"key": "show", "type": {"primitive": "boolean"}, "default": true},
        {"key": "label", "type": {"primitive": "string"}, "default": "New"}
    ]));

    Renderer::new(
        Host::builder()
            .environment(
                StaticEnvironment::new()
                    .with_post(json!({"title": "Post", "views": 10, "status": "publish"}))
                    .with_user(json!({"loggedIn": false})),
            )
            .patterns(MemoryPatternStore::new().with_pattern(badge))
            .build(),
    )
}

#[test]
fn test_null_condition_always_renders() {
    let renderer = renderer();
    let block = Block::new(names::CONDITION).with_inner_blocks(vec![text("shown")]);
    assert_eq!(renderer.render(&[block]), "shown");
    assert_eq!(
        renderer.render(&[condition(Json::Null, vec![text("shown")])]),
        "shown"
    );
}

#[test]
fn test_unknown_operator_renders_nothing() {
    let renderer = renderer();
    let output = renderer.render(&[condition(
        json!({"leftHand": "1", "operator": "between", "rightHand": "1"}),
        vec![text("hidden")],
    )]);
    assert_eq!(output, "");
}

#[test]
fn test_comparisons_against_context() {
    let renderer = renderer();
    let cases = [
        (json!({"leftHand": "{this.status}", "operator": "===", "rightHand": "\"publish\""}), true),
        (json!({"leftHand": "{this.views}", "operator": ">=", "rightHand": "10"}), true),
        (json!({"leftHand": "{this.views}", "operator": "==", "rightHand": "\"10\""}), true),
        (json!({"leftHand": "{this.views}", "operator": "===", "rightHand": "\"10\""}), false),
        (json!({"leftHand": "{user.loggedIn}", "operator": "isFalsy"}), true),
        (json!({"leftHand": "{user.loggedIn}", "operator": "==", "rightHand": "false"}), true),
        (json!({"leftHand": "{this.title}", "operator": "!=", "rightHand": "Post"}), false),
    ];

    for (case, expected) in cases {
        let output = renderer.render(&[condition(case.clone(), vec![text("yes")])]);
        assert_eq!(output == "yes", expected, "condition {}", case);
    }
}

#[test]
fn test_nested_condition_tree() {
    let tree = json!({
        "leftHand": {
            "leftHand": {"leftHand": "{this.views}", "operator": ">", "rightHand": "100"},
            "operator": "||",
            "rightHand": {"leftHand": "{this.status}", "operator": "==", "rightHand": "\"publish\""}
        },
        "operator": "&&",
        "rightHand": {"leftHand": "{user.loggedIn}", "operator": "isFalsy"}
    });
    assert_eq!(renderer().render(&[condition(tree, vec![text("deep")])]), "deep");
}

#[test]
fn test_condition_on_props() {
    let renderer = renderer();
    let badge = |attributes: Json| {
        Block::new(names::COMPONENT)
            .with_attr("ref", "badge")
            .with_attr("attributes", attributes)
    };
    assert_eq!(renderer.render(&[badge(json!({}))]), "New");
    assert_eq!(renderer.render(&[badge(json!({"show": "false"}))]), "");
    assert_eq!(renderer.render(&[badge(json!({"show": false, "label": "x"}))]), "");
}

#[test]
fn test_condition_on_loop_index() {
    let looped = Block::new(names::LOOP)
        .with_attr("target", json!(["a", "b", "c"]))
        .with_inner_blocks(vec![condition(
            json!({"leftHand": "index", "operator": ">", "rightHand": "0"}),
            vec![text(",{item}")],
        )]);
    assert_eq!(renderer().render(&[looped]), ",b,c");
}

#[test]
fn test_condition_keeps_stored_markup() {
    let mut block = condition(
        json!({"leftHand": "true", "operator": "isTruthy"}),
        vec![text("inner")],
    );
    block.inner_content = vec![Some("<p>".to_string()), None, Some("</p>".to_string())];
    assert_eq!(renderer().render(&[block]), "<p>inner</p>");
}
