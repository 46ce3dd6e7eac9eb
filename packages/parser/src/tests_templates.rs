/// Tests for splitting literal text into static chunks and expressions
use crate::ast::*;
use crate::template::parse_template;

fn literal(template: &Template, index: usize) -> &str {
    match &template.parts[index] {
        TemplatePart::Literal(s) => s,
        other => panic!("Expected literal part, got {:?}", other),
    }
}

fn expression(template: &Template, index: usize) -> &Expression {
    match &template.parts[index] {
        TemplatePart::Expression(expr) => expr,
        other => panic!("Expected expression part, got {:?}", other),
    }
}

#[test]
fn test_plain_text_is_one_literal() {
    let template = parse_template("Hello world");
    assert_eq!(template.parts.len(), 1);
    assert_eq!(literal(&template, 0), "Hello world");
    assert!(!template.has_expressions());
}

#[test]
fn test_empty_source_has_no_parts() {
    assert!(parse_template("").parts.is_empty());
}

#[test]
fn test_single_expression() {
    let template = parse_template("{this.title}");
    let expr = template.single_expression().expect("single expression");
    assert_eq!(expr.root, "this");
    assert_eq!(expr.span, Span::new(0, 12));
}

#[test]
fn test_whitespace_inside_braces() {
    let template = parse_template("{ props.text }");
    assert!(template.single_expression().is_some());
}

#[test]
fn test_prefix_suffix_and_multiple() {
    let template = parse_template("Hi {user.name}, you have {user.count} items");
    assert_eq!(template.parts.len(), 5);
    assert_eq!(literal(&template, 0), "Hi ");
    assert_eq!(expression(&template, 1).source, "user.name");
    assert_eq!(literal(&template, 2), ", you have ");
    assert_eq!(expression(&template, 3).source, "user.count");
    assert_eq!(literal(&template, 4), " items");
    assert!(template.single_expression().is_none());
    assert_eq!(template.expressions().count(), 2);
}

#[test]
fn test_unmatched_brace_is_literal() {
    let template = parse_template("broken {this.title");
    assert_eq!(template.parts.len(), 1);
    assert_eq!(literal(&template, 0), "broken {this.title");
}

#[test]
fn test_unmatched_brace_before_valid_expression() {
    let template = parse_template("a { b {this.title}");
    assert_eq!(template.parts.len(), 2);
    assert_eq!(literal(&template, 0), "a { b ");
    assert_eq!(expression(&template, 1).source, "this.title");
}

#[test]
fn test_css_body_is_kept_verbatim() {
    let source = "<style>.card { color: red; }</style>";
    let template = parse_template(source);
    assert_eq!(template.parts.len(), 1);
    assert_eq!(literal(&template, 0), source);
}

#[test]
fn test_json_literal_is_kept_verbatim() {
    let source = r#"{"name":"Item 1"}"#;
    let template = parse_template(source);
    assert!(!template.has_expressions());
    assert_eq!(literal(&template, 0), source);
}

#[test]
fn test_empty_braces_are_literal() {
    let template = parse_template("{}");
    assert_eq!(literal(&template, 0), "{}");
}

#[test]
fn test_closing_brace_inside_quoted_argument() {
    let template = parse_template(r#"{item.name.includes("}")}"#);
    let expr = template.single_expression().expect("single expression");
    assert!(expr.has_modifiers());
}

#[test]
fn test_double_braces() {
    let template = parse_template("{{this.title}}");
    assert_eq!(template.parts.len(), 3);
    assert_eq!(literal(&template, 0), "{");
    assert_eq!(expression(&template, 1).source, "this.title");
    assert_eq!(literal(&template, 2), "}");
}

#[test]
fn test_unbalanced_quote_does_not_swallow_later_expressions() {
    let template = parse_template("{it's} {this.title}");
    assert_eq!(template.expressions().count(), 1);
    assert_eq!(template.expressions().next().map(|e| e.source.as_str()), Some("this.title"));
}
