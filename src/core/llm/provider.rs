//! AI Provider Capability
//!
//! The interface every generative backend implements, the structured reply
//! it produces, and the errors it can fail with.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Proposal
// ============================================================================

/// Structured reply from a provider. Unverified until the backend confirms
/// each term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIProposal {
    #[serde(
        rename = "didYouMean",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub did_you_mean: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl AIProposal {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            did_you_mean: None,
            suggestions,
        }
    }

    pub fn with_did_you_mean(mut self, corrected: impl Into<String>) -> Self {
        self.did_you_mean = Some(corrected.into());
        self
    }

    /// Trim whitespace, treat a blank correction as absent and drop blank terms.
    pub fn normalized(self) -> Self {
        let did_you_mean = self
            .did_you_mean
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let suggestions = self
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            did_you_mean,
            suggestions,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Everything that can go wrong talking to a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to invoke provider: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode provider response: {0}")]
    InvalidResponse(String),

    #[error("empty content from AI provider")]
    EmptyContent,

    #[error("no JSON object found in generated text")]
    NoJsonObject,

    #[error("failed to parse generated text as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("provider configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn config(msg: impl Into<String>) -> Self {
        ProviderError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

// ============================================================================
// Capability
// ============================================================================

/// A generative backend that can propose author searches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Ask for suggestions. An empty `custom_prompt` means the provider builds
    /// its default prompt from `query` and `existing_suggestions`.
    async fn get_suggestions(
        &self,
        query: &str,
        custom_prompt: &str,
        existing_suggestions: &[String],
    ) -> Result<AIProposal>;

    /// Provider name, e.g. "bedrock"
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
