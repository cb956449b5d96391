//! Query Grammar
//!
//! Recursive-descent parser for the catalog's field-qualified query syntax:
//!
//! ```text
//! keyword: {mark twain} AND (author: {clemens} OR title: {huck finn})
//! ```
//!
//! Bare words outside a field group fall under the implicit `keyword` field.
//! The parser collects `field -> values` and notes whether any `NOT` was
//! present; the rest of the boolean structure is checked for well-formedness
//! and otherwise discarded.

use std::collections::BTreeMap;

/// Field that bare terms are filed under.
pub const DEFAULT_FIELD: &str = "keyword";

/// Values collected per field, in the order they appear.
pub type FieldValues = BTreeMap<String, Vec<String>>;

/// Why the raw text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: usize,
    pub message: String,
}

/// Parser output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    pub fields: FieldValues,
    /// At least one `NOT` appeared.
    pub negated: bool,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.position)
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    /// `name:` immediately followed (after whitespace) by a `{...}` group
    Field(String),
    /// Raw contents of a `{...}` group
    Group(String),
    Op(&'static str),
    Word(String),
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, SyntaxError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let err = |position: usize, message: &str| SyntaxError {
        position,
        message: message.to_string(),
    };

    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((pos, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((pos, Token::RParen));
                i += 1;
            }
            '}' => return Err(err(pos, "unexpected '}'")),
            '{' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&(_, ch)| ch == '}')
                    .ok_or_else(|| err(pos, "unterminated '{'"))?;
                let end = i + 1 + close;
                let text: String = chars[i + 1..end].iter().map(|&(_, ch)| ch).collect();
                if text.contains('{') {
                    return Err(err(pos, "nested '{'"));
                }
                tokens.push((pos, Token::Group(text.trim().to_string())));
                i = end + 1;
            }
            '"' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&(_, ch)| ch == '"')
                    .ok_or_else(|| err(pos, "unterminated quote"))?;
                let end = i + 1 + close;
                let phrase: String = chars[i..=end].iter().map(|&(_, ch)| ch).collect();
                tokens.push((pos, Token::Word(phrase)));
                i = end + 1;
            }
            _ => {
                let start = i;
                while i < chars.len() {
                    let ch = chars[i].1;
                    if ch.is_whitespace() || matches!(ch, '(' | ')' | '{' | '}' | '"' | ':') {
                        break;
                    }
                    i += 1;
                }

                let word: String = chars[start..i].iter().map(|&(_, ch)| ch).collect();

                if i < chars.len() && chars[i].1 == ':' {
                    if word.is_empty() || !is_field_name(&word) {
                        return Err(err(pos, "invalid field name"));
                    }
                    tokens.push((pos, Token::Field(word)));
                    i += 1;
                    continue;
                }

                let token = match word.as_str() {
                    "AND" => Token::Op("AND"),
                    "OR" => Token::Op("OR"),
                    "NOT" => Token::Op("NOT"),
                    _ => Token::Word(word),
                };
                tokens.push((pos, token));
            }
        }
    }

    Ok(tokens)
}

fn is_field_name(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    clauses: Clauses,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(p, _)| *p).unwrap_or(self.end)
    }

    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError {
            position: self.offset(),
            message: message.to_string(),
        }
    }

    fn push(&mut self, field: &str, value: String) {
        self.clauses.fields.entry(field.to_string()).or_default().push(value);
    }

    fn expr(&mut self) -> Result<(), SyntaxError> {
        self.unary()?;
        while let Some(Token::Op(op)) = self.peek() {
            if *op == "NOT" {
                self.clauses.negated = true;
            }
            self.pos += 1;
            self.unary()?;
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<(), SyntaxError> {
        if let Some(Token::Op("NOT")) = self.peek() {
            self.pos += 1;
            self.clauses.negated = true;
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<(), SyntaxError> {
        match self.peek().cloned() {
            Some(Token::LParen) => {
                self.pos += 1;
                self.expr()?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(())
                    }
                    _ => Err(self.error("expected ')'")),
                }
            }
            Some(Token::Field(name)) => {
                self.pos += 1;
                match self.peek().cloned() {
                    Some(Token::Group(value)) => {
                        self.pos += 1;
                        self.push(&name, value);
                        Ok(())
                    }
                    _ => Err(self.error("expected '{' after field name")),
                }
            }
            Some(Token::Word(first)) => {
                self.pos += 1;
                let mut words = vec![first];
                while let Some(Token::Word(next)) = self.peek().cloned() {
                    self.pos += 1;
                    words.push(next);
                }
                self.push(DEFAULT_FIELD, words.join(" "));
                Ok(())
            }
            Some(Token::Group(_)) => Err(self.error("'{' group without a field name")),
            Some(Token::RParen) => Err(self.error("unexpected ')'")),
            Some(Token::Op(_)) => Err(self.error("dangling operator")),
            None => Err(self.error("unexpected end of query")),
        }
    }
}

/// Parse raw query text into per-field values.
///
/// Blank input is syntactically valid and yields no fields.
pub fn parse_clauses(input: &str) -> Result<Clauses, SyntaxError> {
    let tokens = tokenize(input)?;

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        clauses: Clauses::default(),
    };

    if parser.tokens.is_empty() {
        return Ok(parser.clauses);
    }

    parser.expr()?;

    if parser.pos < parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }

    Ok(parser.clauses)
}

/// [`parse_clauses`] keeping only the field values.
pub fn parse_fields(input: &str) -> Result<FieldValues, SyntaxError> {
    parse_clauses(input).map(|clauses| clauses.fields)
}
