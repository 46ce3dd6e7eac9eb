//! # Etch Expression Parser
//!
//! Parses the dynamic data mini-language used inside block attributes:
//! `{this.title}`, `{props.items.slice(0, 3)}`, `{item.date.dateFormat("F j, Y")}`.
//!
//! ```rust,ignore
//! use etch_parser::parse_template;
//!
//! let template = parse_template("Hello {user.name.toUpperCase()}!");
//! assert_eq!(template.parts.len(), 3);
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod template;
pub mod tokenizer;

#[cfg(test)]
mod tests_templates;

pub use ast::*;
pub use error::{ParseError, ParseResult};
pub use parser::{parse_expression, Parser};
pub use template::parse_template;
pub use tokenizer::{tokenize, Token};
