use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, unescape, Token};
use std::ops::Range;

/// Recursive-descent parser for a single expression body
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Parse the whole input as one expression; trailing tokens are an error
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        if self.tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let expr = self.parse_path()?;

        if let Some((token, span)) = self.peek() {
            return Err(ParseError::unexpected_token(
                span.start,
                "end of expression",
                token.to_string(),
            ));
        }

        Ok(expr)
    }

    /// path := IDENT step*
    fn parse_path(&mut self) -> ParseResult<Expression> {
        let start = self.current_pos();
        let root = self.expect_ident()?;

        let mut steps = Vec::new();
        loop {
            if self.match_token(&Token::Dot) {
                steps.extend(self.parse_dotted_step()?);
            } else if self.match_token(&Token::LBracket) {
                steps.push(self.parse_bracket_step()?);
            } else {
                break;
            }
        }

        let end = self.previous_end();
        Ok(Expression {
            root,
            steps,
            source: self.source[start..end].to_string(),
            span: Span::new(start, end),
        })
    }

    fn parse_dotted_step(&mut self) -> ParseResult<Vec<Step>> {
        match self.advance() {
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                if self.match_token(&Token::LParen) {
                    let arguments = self.parse_arguments()?;
                    Ok(vec![Step::Call(ModifierCall { name, arguments })])
                } else {
                    Ok(vec![Step::Property(name)])
                }
            }
            // `items.0.1` lexes the trailing segments as one number
            Some((Token::Number(number), span)) => number
                .split('.')
                .map(|part| {
                    part.parse::<i64>().map(Step::Index).map_err(|_| {
                        ParseError::invalid_syntax(span.start, format!("invalid index '{}'", part))
                    })
                })
                .collect(),
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "property or modifier name",
                token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn parse_bracket_step(&mut self) -> ParseResult<Step> {
        let step = match self.advance() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                Step::Property(unescape(s))
            }
            Some((Token::Number(n), span)) => n.parse::<i64>().map(Step::Index).map_err(|_| {
                ParseError::invalid_syntax(span.start, format!("invalid index '{}'", n))
            })?,
            Some((token, span)) => {
                return Err(ParseError::unexpected_token(
                    span.start,
                    "string or index",
                    token.to_string(),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.source.len())),
        };

        self.expect(Token::RBracket)?;
        Ok(step)
    }

    /// Arguments after the opening parenthesis, up to and including `)`
    fn parse_arguments(&mut self) -> ParseResult<Vec<Argument>> {
        let mut arguments = Vec::new();

        if self.match_token(&Token::RParen) {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_argument()?);
            if self.match_token(&Token::Comma) {
                continue;
            }
            self.expect(Token::RParen)?;
            return Ok(arguments);
        }
    }

    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let literal = match self.peek() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                Literal::String(unescape(s))
            }
            Some((Token::Number(n), span)) => n.parse::<f64>().map(Literal::Number).map_err(|_| {
                ParseError::invalid_syntax(span.start, format!("invalid number '{}'", n))
            })?,
            Some((Token::True, _)) => Literal::Boolean(true),
            Some((Token::False, _)) => Literal::Boolean(false),
            Some((Token::Null, _)) => Literal::Null,
            Some((Token::Ident(_), _)) => return Ok(Argument::Path(self.parse_path()?)),
            Some((token, span)) => {
                return Err(ParseError::unexpected_token(
                    span.start,
                    "argument",
                    token.to_string(),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.source.len())),
        };

        self.advance();
        Ok(Argument::Literal(literal))
    }

    // Helper methods

    fn peek(&self) -> Option<(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<(Token<'src>, Range<usize>)> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &Token<'src>) -> bool {
        matches!(self.tokens.get(self.pos), Some((token, _)) if token == expected)
    }

    fn match_token(&mut self, expected: &Token<'src>) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token<'src>) -> ParseResult<()> {
        match self.advance() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                expected.to_string(),
                token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some((Token::Ident(name), _)) => Ok(name.to_string()),
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                "identifier",
                token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }
}

/// Parse a single expression body (the text between braces)
pub fn parse_expression(source: &str) -> ParseResult<Expression> {
    Parser::new(source)?.parse_expression()
}
