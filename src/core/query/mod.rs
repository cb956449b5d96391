//! Query Eligibility
//!
//! Decides whether a raw catalog query is a single unqualified keyword term
//! that author suggestions can be computed for. Pure; never touches the
//! backend.

pub mod grammar;

pub use grammar::{parse_clauses, parse_fields, Clauses, FieldValues, SyntaxError, DEFAULT_FIELD};

use thiserror::Error;

/// Keyword value that means "match everything".
pub const WILDCARD: &str = "*";

/// Reasons a query is not eligible for suggestions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed syntax: {0}")]
    Malformed(SyntaxError),

    #[error("unhandled query")]
    Unhandled,

    #[error("negated query")]
    Negated,

    #[error("blank or wildcard keyword")]
    BlankOrWildcard,
}

/// A query that passed eligibility checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    term: String,
}

impl ParsedQuery {
    /// Parse and validate raw query text.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let clauses = parse_clauses(raw).map_err(QueryError::Malformed)?;
        if clauses.negated {
            return Err(QueryError::Negated);
        }

        // only a lone keyword field with a lone value is handled
        let fields = clauses.fields;
        let term = match fields.get(DEFAULT_FIELD) {
            Some(values) if fields.len() == 1 && values.len() == 1 => values[0].clone(),
            _ => return Err(QueryError::Unhandled),
        };

        if term.is_empty() || term == WILDCARD {
            return Err(QueryError::BlankOrWildcard);
        }

        Ok(Self { term })
    }

    /// The keyword value that will be sent to the backend.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn into_term(self) -> String {
        self.term
    }
}
