//! Suggestion Pipeline Errors
//!
//! Unifies the per-stage errors. None of these reach an HTTP caller; the
//! service recovers every one of them and logs the class.

use thiserror::Error;

use crate::core::llm::ProviderError;
use crate::core::query::QueryError;
use crate::core::search::SearchError;

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Coarse failure class, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuery,
    BackendUnavailable,
    BackendError,
    ProviderError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidQuery => "invalid_query",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::BackendError => "backend_error",
            ErrorKind::ProviderError => "provider_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SuggestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuggestError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            SuggestError::Search(e) if e.is_unavailable() => ErrorKind::BackendUnavailable,
            SuggestError::Search(_) => ErrorKind::BackendError,
            SuggestError::Provider(_) => ErrorKind::ProviderError,
        }
    }
}

pub type Result<T> = std::result::Result<T, SuggestError>;
