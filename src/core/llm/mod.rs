//! AI Refinement Module
//!
//! Optional generative-AI step of the suggestion pipeline:
//! - `provider`: the `AIProvider` capability, `AIProposal` and `ProviderError`
//! - `prompt`: default prompt and operator templates
//! - `response`: turning generated text into a proposal
//! - `dialect`: per-model request/response payloads
//! - `signing`: AWS SigV4 request signing
//! - `credentials`: the default AWS credential chain and refresh cache
//! - `providers`: concrete providers and the config factory
//! - `refiner`: `AIRefiner`, the pipeline-facing entry point

pub mod credentials;
pub mod dialect;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod refiner;
pub mod response;
pub mod signing;

pub use credentials::{CredentialSource, CredentialsCache, DefaultCredentialsChain};
pub use provider::{AIProposal, AIProvider, ProviderError, Result};
pub use providers::{from_config, BedrockConfig, BedrockProvider};
pub use refiner::AIRefiner;

#[cfg(test)]
pub use provider::MockAIProvider;
