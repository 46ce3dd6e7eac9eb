//! Loop blocks over targets and stored presets
use crate::host::{Host, MemoryDataSource, StaticEnvironment};
use crate::renderer::Renderer;
use etch_common::{names, Block};
use serde_json::{json, Value as Json};

fn text(content: &str) -> Block {
    Block::new(names::TEXT).with_attr("content", content)
}

fn target_loop(target: impl Into<Json>, children: Vec<Block>) -> Block {
    Block::new(names::LOOP)
        .with_attr("target", target)
        .with_inner_blocks(children)
}

fn preset_loop(loop_id: &str, params: Json, children: Vec<Block>) -> Block {
    Block::new(names::LOOP)
        .with_attr("loopId", loop_id)
        .with_attr("loopParams", params)
        .with_inner_blocks(children)
}

fn renderer() -> Renderer {
    Renderer::new(
        Host::builder()
            .environment(
                StaticEnvironment::new()
                    .with_post(json!({
                        "title": "Post",
                        "kind": "page",
                        "limit": "1",
                        "items": [{"name": "Item 1"}, {"name": "Item 2"}],
                        "groups": [
                            {"name": "A", "tags": ["x", "y"]},
                            {"name": "B", "tags": ["z"]}
                        ],
                        "byId": {"z": "first", "a": "second", "m": "third"}
                    }))
                    .with_option(
                        "etch_loops",
                        json!({
                            "k7f2": {
                                "key": "items",
                                "type": "json",
                                "data": [{"name": "Item 1"}, {"name": "Item 2"}]
                            },
                            "q1": {
                                "key": "pages",
                                "type": "wp-query",
                                "args": {"post_type": "$type", "posts_per_page": "$count"}
                            },
                            "u1": {"key": "editors", "type": "wp-users", "args": {"role": "editor"}},
                            "t1": {"key": "categories", "type": "wp-terms", "args": {"taxonomy": "category"}},
                            "bad": {"key": "bad", "type": "json", "data": "not json"}
                        }),
                    ),
            )
            .data(
                MemoryDataSource::new()
                    .with_posts(json!([
                        {"title": "A", "post_type": "page"},
                        {"title": "B", "post_type": "post"},
                        {"title": "C", "post_type": "page"}
                    ]))
                    .with_users(json!([
                        {"name": "Ed", "roles": ["editor"]},
                        {"name": "Al", "roles": ["administrator"]}
                    ]))
                    .with_terms(json!([
                        {"name": "News", "taxonomy": "category"},
                        {"name": "rust", "taxonomy": "post_tag"}
                    ])),
            )
            .build(),
    )
}

#[test]
fn test_loop_over_path_target() {
    let output = renderer().render(&[target_loop("this.items", vec![text("[{item.name}]")])]);
    assert_eq!(output, "[Item 1][Item 2]");
}

#[test]
fn test_loop_over_braced_target() {
    let output = renderer().render(&[target_loop("{this.items}", vec![text("{index}:{item.name};")])]);
    assert_eq!(output, "0:Item 1;1:Item 2;");
}

#[test]
fn test_slice_keeps_only_first_item() {
    let output = renderer().render(&[target_loop("this.items.slice(0, 1)", vec![text("{item.name}")])]);
    assert_eq!(output, "Item 1");
}

#[test]
fn test_nested_loops_keep_both_bindings() {
    let inner = target_loop("group.tags", vec![text("{group.name}{tag}{i}{j} ")])
        .with_attr("itemId", "tag")
        .with_attr("indexId", "j");
    let outer = target_loop("this.groups", vec![inner])
        .with_attr("itemId", "group")
        .with_attr("indexId", "i");

    assert_eq!(renderer().render(&[outer]), "Ax00 Ay01 Bz10 ");
}

#[test]
fn test_non_collections_render_nothing() {
    let renderer = renderer();
    assert_eq!(renderer.render(&[target_loop("this.title", vec![text("x")])]), "");
    assert_eq!(renderer.render(&[target_loop("this.missing", vec![text("x")])]), "");
    assert_eq!(renderer.render(&[target_loop(json!([]), vec![text("x")])]), "");
    assert_eq!(
        renderer.render(&[Block::new(names::LOOP).with_inner_blocks(vec![text("x")])]),
        ""
    );
}

#[test]
fn test_object_target_iterates_values() {
    let output = renderer().render(&[target_loop("this.byId", vec![text("{item}{index},")])]);
    assert_eq!(output, "first0,second1,third2,");

    let inline = target_loop(r#"{"b": 1, "a": 2}"#, vec![text("{item}")]);
    assert_eq!(renderer().render(&[inline]), "12");
}

#[test]
fn test_bindings_do_not_leak_after_loop() {
    let output = renderer().render(&[
        target_loop(json!(["a"]), vec![text("{item}")]),
        text("|{item}{index}|"),
    ]);
    assert_eq!(output, "a||");
}

#[test]
fn test_json_preset_by_id_and_key() {
    let renderer = renderer();
    let children = || vec![text("{item.name};")];
    assert_eq!(
        renderer.render(&[preset_loop("k7f2", json!({}), children())]),
        "Item 1;Item 2;"
    );
    assert_eq!(
        renderer.render(&[preset_loop("items", json!({}), children())]),
        "Item 1;Item 2;"
    );
}

#[test]
fn test_query_preset_with_params() {
    let output = renderer().render(&[preset_loop(
        "pages",
        json!({"type": "{this.kind}", "count": "{this.limit.toInt()}"}),
        vec![text("{item.title}")],
    )]);
    assert_eq!(output, "A");

    let output = renderer().render(&[preset_loop(
        "q1",
        json!({"type": "page", "count": -1}),
        vec![text("{item.title}")],
    )]);
    assert_eq!(output, "AC");
}

#[test]
fn test_user_and_term_presets() {
    let renderer = renderer();
    assert_eq!(
        renderer.render(&[preset_loop("editors", json!({}), vec![text("{item.name}")])]),
        "Ed"
    );
    assert_eq!(
        renderer.render(&[preset_loop("categories", json!({}), vec![text("{item.name}")])]),
        "News"
    );
}

#[test]
fn test_missing_or_invalid_preset_renders_nothing() {
    let renderer = renderer();
    assert_eq!(
        renderer.render(&[preset_loop("nope", json!({}), vec![text("x")]), text("sibling")]),
        "sibling"
    );
    assert_eq!(renderer.render(&[preset_loop("bad", json!({}), vec![text("x")])]), "");
}
