//! AI Provider Implementations
//!
//! Concrete [`AIProvider`] backends and the factory that picks one from
//! configuration.
//!
//! Adding a new provider requires:
//! 1. A new entry in `PROVIDERS`
//! 2. A match arm in [`from_config`]
//! 3. The provider implementation file

mod bedrock;

pub use bedrock::{BedrockConfig, BedrockProvider, DEFAULT_MODEL};

use std::sync::Arc;

use super::credentials::{env_lookup, profile_region, DefaultCredentialsChain, Lookup};
use super::provider::{AIProvider, ProviderError, Result};
use crate::config::AiConfig;

/// Provider names accepted in `ai.provider`.
pub const PROVIDERS: &[&str] = &["bedrock"];

/// Build the configured provider.
///
/// `Ok(None)` means AI refinement is switched off (`provider` blank or
/// `"none"`). Bedrock credentials come from the default AWS chain and are
/// resolved on first use.
pub fn from_config(config: &AiConfig) -> Result<Option<Arc<dyn AIProvider>>> {
    from_config_with(config, env_lookup())
}

/// [`from_config`] with an injectable environment lookup.
pub fn from_config_with(config: &AiConfig, lookup: Lookup) -> Result<Option<Arc<dyn AIProvider>>> {
    let kind = config.provider.trim().to_lowercase();

    match kind.as_str() {
        "" | "none" => Ok(None),
        "bedrock" => {
            let region = resolve_region(config.region.as_deref(), &lookup).ok_or_else(|| {
                ProviderError::config(
                    "no region: set ai.region, AWS_REGION, AWS_DEFAULT_REGION or a profile region",
                )
            })?;
            let credentials = DefaultCredentialsChain::new(lookup)?;

            let mut bedrock = BedrockConfig::new(config.model.clone(), region)
                .with_timeouts(config.connect_timeout(), config.request_timeout());
            if let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
                bedrock = bedrock.with_endpoint(endpoint);
            }

            let provider: Arc<dyn AIProvider> = Arc::new(BedrockProvider::new(bedrock, credentials)?);
            Ok(Some(provider))
        }
        other => Err(ProviderError::config(format!(
            "unknown AI provider '{}' (supported: {})",
            other,
            PROVIDERS.join(", ")
        ))),
    }
}

/// Configured region, then `AWS_REGION`, `AWS_DEFAULT_REGION`, then the
/// active shared profile.
fn resolve_region(configured: Option<&str>, lookup: &Lookup) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .or_else(|| lookup("AWS_REGION").filter(|r| !r.trim().is_empty()))
        .or_else(|| lookup("AWS_DEFAULT_REGION").filter(|r| !r.trim().is_empty()))
        .or_else(|| profile_region(lookup))
}
