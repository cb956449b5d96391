//! Author Suggestion Pipeline
//!
//! - `retriever`: scored candidates from the search backend
//! - `filter`: statistical outlier cutoff
//! - `verifier`: concurrent hit checks for AI-proposed terms
//! - `service`: `SuggestionService`, which ties the stages together

pub mod error;
pub mod filter;
pub mod retriever;
pub mod service;
pub mod types;
pub mod verifier;

pub use error::{ErrorKind, SuggestError};
pub use filter::{ConfidenceFilter, ScoreStats};
pub use retriever::{CandidateRetriever, RetrievalParams};
pub use service::{SuggestSettings, SuggestionService};
pub use types::{Candidate, Suggestion, SuggestionRequest, SuggestionResponse, VerificationResult};
pub use verifier::Verifier;
