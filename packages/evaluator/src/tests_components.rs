//! Component instantiation and props scoping
use crate::config::EtchConfig;
use crate::host::{Host, MemoryPatternStore, Pattern, StaticEnvironment};
use crate::renderer::Renderer;
use etch_common::{names, Block};
use serde_json::{json, Value as Json};

fn text(content: &str) -> Block {
    Block::new(names::TEXT).with_attr("content", content)
}

fn component(reference: impl Into<Json>, attributes: Json) -> Block {
    Block::new(names::COMPONENT)
        .with_attr("ref", reference)
        .with_attr("attributes", attributes)
}

fn string_prop(key: &str, default: &str) -> Json {
    json!({"key": key, "type": {"primitive": "string"}, "default": default})
}

fn renderer_with(patterns: Vec<Pattern>, config: EtchConfig) -> Renderer {
    let mut store = MemoryPatternStore::new();
    for pattern in patterns {
        store.add_pattern(pattern);
    }
    Renderer::with_config(
        Host::builder()
            .environment(StaticEnvironment::new().with_post(json!({"title": "Post", "count": 3})))
            .patterns(store)
            .build(),
        config,
    )
}

fn renderer(patterns: Vec<Pattern>) -> Renderer {
    renderer_with(patterns, EtchConfig::default())
}

fn card() -> Pattern {
    Pattern::new("10", vec![text("{props.text}")])
        .with_properties(json!([string_prop("text", "Default Text")]))
}

#[test]
fn test_default_used_when_attribute_absent() {
    let renderer = renderer(vec![card()]);
    assert_eq!(renderer.render(&[component(10, json!({}))]), "Default Text");
    assert_eq!(
        renderer.render(&[Block::new(names::COMPONENT).with_attr("ref", "10")]),
        "Default Text"
    );
}

#[test]
fn test_override_wins_even_when_empty() {
    let renderer = renderer(vec![card()]);
    assert_eq!(renderer.render(&[component(10, json!({"text": "Custom"}))]), "Custom");
    assert_eq!(renderer.render(&[component(10, json!({"text": ""}))]), "");
    assert_eq!(renderer.render(&[component(10, json!({"text": null}))]), "");
}

#[test]
fn test_invalid_references_render_nothing() {
    let renderer = renderer(vec![
        card(),
        Pattern::new("11", vec![text("page")]).with_post_type("page"),
    ]);
    assert_eq!(renderer.render(&[Block::new(names::COMPONENT)]), "");
    assert_eq!(renderer.render(&[component(Json::Null, json!({}))]), "");
    assert_eq!(renderer.render(&[component(999, json!({}))]), "");
    assert_eq!(renderer.render(&[component(11, json!({}))]), "");
    assert_eq!(
        renderer.render(&[component(999, json!({})), text("sibling")]),
        "sibling"
    );
}

#[test]
fn test_nested_props_shadow_and_restore() {
    let outer = Pattern::new(
        "1",
        vec![
            text("{props.text}|"),
            component(2, json!({"text": "Nested Text"})),
            text("|{props.text}"),
        ],
    )
    .with_properties(json!([string_prop("text", "")]));
    let inner = Pattern::new("2", vec![text("{props.text}")])
        .with_properties(json!([string_prop("text", "")]));

    let renderer = renderer(vec![outer, inner]);
    assert_eq!(
        renderer.render(&[component(1, json!({"text": "Parent Text"})), text("|{props.text}end")]),
        "Parent Text|Nested Text|Parent Text|end"
    );
}

#[test]
fn test_props_are_not_merged_from_parent() {
    let outer = Pattern::new("1", vec![component(3, json!({}))])
        .with_properties(json!([string_prop("text", "outer")]));
    let bare = Pattern::new("3", vec![text("[{props.text}]")]);

    let renderer = renderer(vec![outer, bare]);
    assert_eq!(renderer.render(&[component(1, json!({}))]), "[]");
}

#[test]
fn test_instance_attributes_resolve_in_caller_scope() {
    let outer = Pattern::new("1", vec![component(2, json!({"text": "{props.label}!"}))])
        .with_properties(json!([string_prop("label", "from outer")]));
    let inner = Pattern::new("2", vec![text("{props.text}")])
        .with_properties(json!([string_prop("text", ""), string_prop("label", "from inner")]));

    let renderer = renderer(vec![outer, inner]);
    assert_eq!(renderer.render(&[component(1, json!({}))]), "from outer!");
}

#[test]
fn test_defaults_see_earlier_props_but_not_themselves() {
    let pattern = Pattern::new("5", vec![text("{props.first}/{props.second}/{props.own}")])
        .with_properties(json!([
            string_prop("first", "{this.title}"),
            string_prop("second", "{props.first}-2"),
            string_prop("own", "{props.own}")
        ]));

    let renderer = renderer(vec![pattern]);
    assert_eq!(renderer.render(&[component(5, json!({}))]), "Post/Post-2/");
}

#[test]
fn test_typed_props() {
    let pattern = Pattern::new(
        "6",
        vec![text("{props.count.greater(2)}|{props.enabled}|{props.tags.length()}|{props.size}")],
    )
    .with_properties(json!([
        {"key": "count", "type": {"primitive": "number"}, "default": 0},
        {"key": "enabled", "type": {"primitive": "boolean"}, "default": false},
        {"key": "tags", "type": {"primitive": "array"}, "default": []},
        {"key": "size", "type": {"primitive": "string", "specialized": "select"}, "default": "md", "options": ["sm", "md"]},
        {"key": "broken", "type": {"primitive": "color"}, "default": "red"}
    ]));

    let renderer = renderer(vec![pattern]);
    assert_eq!(
        renderer.render(&[component(
            6,
            json!({"count": "{this.count}", "enabled": "TRUE", "tags": "a, b,c", "broken": "x"})
        )]),
        "true|true|3|md"
    );
}

#[test]
fn test_recursive_pattern_stops_at_depth_limit() {
    let recursive = Pattern::new("7", vec![text("x"), component(7, json!({}))]);
    let config = EtchConfig {
        max_component_depth: 3,
        ..EtchConfig::default()
    };

    let renderer = renderer_with(vec![recursive], config);
    assert_eq!(
        renderer.render(&[component(7, json!({})), text("|after")]),
        "xxx|after"
    );
}

#[test]
fn test_custom_pattern_post_type() {
    let config = EtchConfig {
        pattern_post_type: "etch_component".to_string(),
        ..EtchConfig::default()
    };
    let renderer = renderer_with(
        vec![
            card(),
            Pattern::new("12", vec![text("ok")]).with_post_type("etch_component"),
        ],
        config,
    );
    assert_eq!(renderer.render(&[component(10, json!({}))]), "");
    assert_eq!(renderer.render(&[component(12, json!({}))]), "ok");
}
