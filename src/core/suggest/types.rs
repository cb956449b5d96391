//! Suggestion Types
//!
//! Request-scoped values flowing through the pipeline and the JSON envelopes
//! exchanged with callers.

use serde::{Deserialize, Serialize};

/// Suggestion type emitted by this service.
pub const AUTHOR: &str = "author";

/// A phrase retrieved from the backend with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub phrase: String,
    pub score: f64,
}

impl Candidate {
    pub fn new(phrase: impl Into<String>, score: f64) -> Self {
        Self {
            phrase: phrase.into(),
            score,
        }
    }
}

/// One alternate search offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Suggestion {
    pub fn author(value: impl Into<String>) -> Self {
        Self {
            kind: AUTHOR.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub query: String,
}

impl SuggestionRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
}

impl SuggestionResponse {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self { suggestions }
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Suggestion values in order.
    pub fn values(&self) -> Vec<&str> {
        self.suggestions.iter().map(|s| s.value.as_str()).collect()
    }
}

/// Outcome of checking one proposed term against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub term: String,
    pub valid: bool,
}
