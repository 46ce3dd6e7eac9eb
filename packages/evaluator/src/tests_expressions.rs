//! Expression resolution through rendered blocks
use crate::host::{Host, StaticEnvironment};
use crate::renderer::Renderer;
use crate::value::Value;
use etch_common::{names, Block};
use serde_json::json;

fn renderer() -> Renderer {
    Renderer::new(
        Host::builder()
            .environment(
                StaticEnvironment::new()
                    .with_post(json!({
                        "title": "  Test Post Title ",
                        "date": "2024-03-05 14:07:00",
                        "views": 1234.5,
                        "tags": ["rust", "wordpress", "blocks"],
                        "meta": {"type": "news"}
                    }))
                    .with_site(json!({"name": "Etch", "url": "https://example.com"}))
                    .with_user(json!({"name": "Ada", "loggedIn": true}))
                    .with_url(json!({"query": {"page": "2"}}))
                    .with_options(json!({"accent": "#ff0000"})),
            )
            .build(),
    )
}

fn text(content: &str) -> String {
    renderer().render(&[Block::new(names::TEXT).with_attr("content", content)])
}

#[test]
fn test_every_global_namespace() {
    assert_eq!(
        text("{site.name}|{user.name}|{url.query.page}|{options.accent}|{this.meta.type}"),
        "Etch|Ada|2|#ff0000|news"
    );
}

#[test]
fn test_modifier_chains() {
    assert_eq!(text("{this.title.trim().toUpperCase()}"), "TEST POST TITLE");
    assert_eq!(text("{this.tags.length()}"), "3");
    assert_eq!(text("{this.tags.at(-1)}"), "blocks");
    assert_eq!(text("{this.tags.slice(0, 2).join(\", \")}"), "rust, wordpress");
    assert_eq!(text("{this.views.ceil()}"), "1235");
    assert_eq!(text("{this.views.toInt()}"), "1234");
}

#[test]
fn test_comparison_modifiers() {
    assert_eq!(text("{this.meta.type.equal(\"news\")}"), "true");
    assert_eq!(text("{this.views.greater(2000, \"big\", \"small\")}"), "small");
    assert_eq!(text("{this.tags.includes(\"rust\")}"), "true");
}

#[test]
fn test_date_format() {
    assert_eq!(text("{this.date.dateFormat(\"Y-m-d\")}"), "2024-03-05");
    assert_eq!(text("{this.date.dateFormat()}"), "March 5, 2024");
}

#[test]
fn test_number_format_with_oversized_precision() {
    assert_eq!(
        text("{this.views.numberFormat(99999999999999999999)}"),
        "1,234.50000000000000000000"
    );
}

#[test]
fn test_unmatched_brace_is_literal() {
    assert_eq!(text("Price {this.views"), "Price {this.views");
    assert_eq!(text(".a { color: red }"), ".a { color: red }");
}

#[test]
fn test_unresolved_paths_are_empty() {
    assert_eq!(text("[{this.nope}|{nobody.home}|{this.meta.type.nope}]"), "[||]");
}

#[test]
fn test_unknown_modifier_is_empty() {
    assert_eq!(text("a{this.meta.type.explode()}b"), "ab");
}

#[test]
fn test_single_expression_keeps_native_type() {
    let renderer = renderer();
    let session = renderer.session();
    assert_eq!(
        session.resolve("{this.tags}"),
        Value::from(json!(["rust", "wordpress", "blocks"]))
    );
    assert_eq!(session.resolve("{user.loggedIn}"), Value::Boolean(true));
    assert_eq!(session.resolve("{this.views}"), Value::Number(1234.5));
    assert_eq!(session.resolve(" {this.views}"), Value::string(" 1234.5"));
}
