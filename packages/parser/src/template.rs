//! Splits literal text into static chunks and `{…}` expressions.
//!
//! Braces that do not close, or whose body is not a valid expression (CSS
//! rule bodies, inline JSON), stay in the output exactly as written.

use crate::ast::{Span, Template, TemplatePart};
use crate::parser::parse_expression;

enum Close {
    /// Index of the matching `}`
    Found(usize),
    /// Another `{` started before this one closed
    Interrupted(usize),
    Missing,
}

/// Parse a template string. Never fails.
pub fn parse_template(source: &str) -> Template {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find('{') {
        let open = cursor + offset;
        literal.push_str(&source[cursor..open]);

        match find_close(source, open) {
            Close::Found(close) => {
                match parse_expression(source[open + 1..close].trim()) {
                    Ok(mut expr) => {
                        if !literal.is_empty() {
                            parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                        }
                        expr.span = Span::new(open, close + 1);
                        parts.push(TemplatePart::Expression(expr));
                    }
                    Err(_) => literal.push_str(&source[open..=close]),
                }
                cursor = close + 1;
            }
            Close::Interrupted(next_open) => {
                literal.push_str(&source[open..next_open]);
                cursor = next_open;
            }
            Close::Missing => {
                literal.push('{');
                cursor = open + 1;
            }
        }
    }

    literal.push_str(&source[cursor..]);
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    Template { parts }
}

fn find_close(source: &str, open: usize) -> Close {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in source[open + 1..].char_indices() {
        let index = open + 1 + offset;

        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' => return Close::Interrupted(index),
            '}' => return Close::Found(index),
            _ => {}
        }
    }

    Close::Missing
}
