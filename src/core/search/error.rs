//! Search Error Types
//!
//! Error handling for the search backend client.

use thiserror::Error;

/// Search backend errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// Connection refused, timed out, or otherwise never got a response.
    #[error("search backend unavailable: {url} {reason}")]
    Unavailable { url: String, reason: String },

    /// The backend answered with something we could not decode.
    #[error("failed to decode search response from {url}: {message}")]
    Malformed { url: String, message: String },

    /// The backend decoded fine but reported a failure in its header.
    #[error("search backend error {code} - {message}")]
    Backend { code: i64, message: String },

    /// Ping succeeded at the HTTP level but the core is not serving.
    #[error("ping status was not OK (got {0:?})")]
    Unhealthy(String),

    #[error("invalid search backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl SearchError {
    /// True for connection-level failures that a retry could clear.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SearchError::Unavailable { .. })
    }
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
