use serde::{Deserialize, Serialize};

/// Source location of an expression inside its template, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A literal string with zero or more embedded `{…}` expressions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    pub parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplatePart {
    Literal(String),
    Expression(Expression),
}

impl Template {
    /// The expression when the template is exactly one `{…}` with no
    /// surrounding text. Such templates evaluate to a typed value.
    pub fn single_expression(&self) -> Option<&Expression> {
        match self.parts.as_slice() {
            [TemplatePart::Expression(expr)] => Some(expr),
            _ => None,
        }
    }

    pub fn has_expressions(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, TemplatePart::Expression(_)))
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Expression(expr) => Some(expr),
            TemplatePart::Literal(_) => None,
        })
    }
}

/// A context path followed by property accesses and modifier calls,
/// e.g. `item.meta.title.trim().toUpperCase()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub root: String,
    pub steps: Vec<Step>,
    /// Raw expression text, without braces
    pub source: String,
    pub span: Span,
}

impl Expression {
    pub fn has_modifiers(&self) -> bool {
        self.steps.iter().any(|step| matches!(step, Step::Call(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Property(String),
    Index(i64),
    Call(ModifierCall),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierCall {
    pub name: String,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Argument {
    Literal(Literal),
    Path(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}
