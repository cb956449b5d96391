//! AWS Credential Resolution
//!
//! Default chain, first match wins:
//! 1. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`
//! 2. Shared `config` and `credentials` files, profile `AWS_PROFILE` or `default`
//! 3. Container credentials (`AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` or `_FULL_URI`)
//! 4. EC2 instance metadata (IMDSv2)
//!
//! Temporary credentials are cached and refreshed shortly before they expire.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::provider::{ProviderError, Result};
use super::signing::AwsCredentials;

/// Environment lookup, injectable for tests.
pub type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Base URL for `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI`.
pub const CONTAINER_HOST: &str = "http://169.254.170.2";
/// Default instance metadata endpoint.
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254";
pub const DEFAULT_PROFILE: &str = "default";

const IMDS_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const IMDS_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const IMDS_TOKEN_TTL_SECS: &str = "21600";

/// Refresh temporary credentials this many seconds before they expire.
pub const REFRESH_WINDOW_SECS: i64 = 300;
/// After a failed resolution, wait this long before trying the chain again.
pub const RETRY_AFTER_SECS: i64 = 30;

/// Profile keys that need an STS or SSO exchange.
const UNSUPPORTED_PROFILE_KEYS: &[&str] = &["role_arn", "sso_session", "sso_start_url", "credential_process"];

/// The process environment.
pub fn env_lookup() -> Lookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

fn non_empty(lookup: &Lookup, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Static,
    Environment,
    Profile,
    Container,
    InstanceMetadata,
}

impl CredentialSource {
    /// Chain order.
    pub const CHAIN: [CredentialSource; 4] = [
        CredentialSource::Environment,
        CredentialSource::Profile,
        CredentialSource::Container,
        CredentialSource::InstanceMetadata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Static => "static",
            CredentialSource::Environment => "environment",
            CredentialSource::Profile => "shared profile",
            CredentialSource::Container => "container",
            CredentialSource::InstanceMetadata => "instance metadata",
        }
    }
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Credentials from the `AWS_*` variables. Both the key id and the secret
/// must be present.
pub fn environment_credentials(lookup: &Lookup) -> Option<AwsCredentials> {
    let access_key_id = non_empty(lookup, "AWS_ACCESS_KEY_ID")?;
    let secret_access_key = non_empty(lookup, "AWS_SECRET_ACCESS_KEY")?;

    let mut credentials = AwsCredentials::new(access_key_id, secret_access_key);
    credentials.session_token = non_empty(lookup, "AWS_SESSION_TOKEN");
    Some(credentials)
}

// ============================================================================
// Shared config files
// ============================================================================

/// Properties per profile name.
pub type ProfileSections = HashMap<String, HashMap<String, String>>;

/// Parse a shared `config` or `credentials` file. `[profile name]` and
/// `[name]` headers both map to `name`; keys are lowercased.
pub fn parse_profile_file(text: &str) -> ProfileSections {
    let mut sections = ProfileSections::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let header = header.trim();
            let name = header.strip_prefix("profile ").map(str::trim).unwrap_or(header);
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    sections
}

pub fn profile_name(lookup: &Lookup) -> String {
    non_empty(lookup, "AWS_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

pub fn config_file(lookup: &Lookup) -> Option<PathBuf> {
    shared_file(lookup, "AWS_CONFIG_FILE", "config")
}

pub fn credentials_file(lookup: &Lookup) -> Option<PathBuf> {
    shared_file(lookup, "AWS_SHARED_CREDENTIALS_FILE", "credentials")
}

fn shared_file(lookup: &Lookup, var: &str, name: &str) -> Option<PathBuf> {
    match non_empty(lookup, var) {
        Some(path) => Some(expand_home(&path)),
        None => dirs::home_dir().map(|home| home.join(".aws").join(name)),
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// The active profile's properties. Credentials-file values override
/// config-file values.
pub fn load_profile(lookup: &Lookup) -> HashMap<String, String> {
    let name = profile_name(lookup);
    let mut merged = HashMap::new();

    for path in [config_file(lookup), credentials_file(lookup)].into_iter().flatten() {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                if let Some(section) = parse_profile_file(&text).remove(&name) {
                    merged.extend(section);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to read AWS file {}: {}", path.display(), e),
        }
    }

    merged
}

/// `region` from the active profile.
pub fn profile_region(lookup: &Lookup) -> Option<String> {
    load_profile(lookup)
        .remove("region")
        .filter(|r| !r.trim().is_empty())
}

pub fn profile_credentials(lookup: &Lookup) -> Option<AwsCredentials> {
    let profile = load_profile(lookup);
    let get = |key: &str| profile.get(key).filter(|v| !v.is_empty()).cloned();

    match (get("aws_access_key_id"), get("aws_secret_access_key")) {
        (Some(id), Some(secret)) => {
            let mut credentials = AwsCredentials::new(id, secret);
            credentials.session_token = get("aws_session_token");
            Some(credentials)
        }
        _ => {
            if let Some(key) = UNSUPPORTED_PROFILE_KEYS.iter().find(|k| profile.contains_key(**k)) {
                log::warn!(
                    "AWS profile {} uses {}, which is not supported here; trying other sources",
                    profile_name(lookup),
                    key
                );
            }
            None
        }
    }
}

// ============================================================================
// Container and instance metadata
// ============================================================================

/// Body returned by both the container endpoint and IMDS.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemporaryCredentials {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expiration: Option<DateTime<Utc>>,
    /// IMDS only; "Success" when valid.
    #[serde(default)]
    code: Option<String>,
}

impl TemporaryCredentials {
    fn into_credentials(self, source: CredentialSource) -> Result<AwsCredentials> {
        if let Some(code) = self.code.filter(|c| c != "Success") {
            return Err(ProviderError::Credentials(format!("{} returned code {}", source, code)));
        }

        let mut credentials = AwsCredentials::new(self.access_key_id, self.secret_access_key);
        credentials.session_token = self.token.filter(|t| !t.is_empty());
        credentials.expires_at = self.expiration;
        Ok(credentials)
    }
}

async fn fetch_temporary(request: RequestBuilder, source: CredentialSource) -> Result<AwsCredentials> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ProviderError::Credentials(format!(
            "{} endpoint returned status {}",
            source,
            status.as_u16()
        )));
    }

    let body: TemporaryCredentials = resp.json().await?;
    body.into_credentials(source)
}

/// Walks the default chain on demand.
pub struct DefaultCredentialsChain {
    lookup: Lookup,
    client: Client,
    container_host: String,
}

impl DefaultCredentialsChain {
    pub fn new(lookup: Lookup) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(3))
            .build()?;

        Ok(Self {
            lookup,
            client,
            container_host: CONTAINER_HOST.to_string(),
        })
    }

    /// Base URL that relative container URIs resolve against.
    pub fn with_container_host(mut self, host: impl Into<String>) -> Self {
        self.container_host = host.into();
        self
    }

    /// First source that yields credentials.
    pub async fn resolve(&self) -> Result<(AwsCredentials, CredentialSource)> {
        let mut failures = Vec::new();

        for source in CredentialSource::CHAIN {
            match self.load(source).await {
                Ok(Some(credentials)) => return Ok((credentials, source)),
                Ok(None) => log::trace!("no AWS credentials from {}", source),
                Err(e) => {
                    log::debug!("AWS credentials from {} failed: {}", source, e);
                    failures.push(format!("{}: {}", source, e));
                }
            }
        }

        let message = if failures.is_empty() {
            "no credentials in environment, shared profile, container or instance metadata".to_string()
        } else {
            format!("no usable credentials ({})", failures.join("; "))
        };
        Err(ProviderError::Credentials(message))
    }

    /// Credentials from one source. `Ok(None)` means the source is not
    /// configured here.
    pub async fn load(&self, source: CredentialSource) -> Result<Option<AwsCredentials>> {
        match source {
            CredentialSource::Static => Ok(None),
            CredentialSource::Environment => Ok(environment_credentials(&self.lookup)),
            CredentialSource::Profile => Ok(profile_credentials(&self.lookup)),
            CredentialSource::Container => self.container_credentials().await,
            CredentialSource::InstanceMetadata => self.instance_credentials().await,
        }
    }

    async fn container_credentials(&self) -> Result<Option<AwsCredentials>> {
        let url = if let Some(relative) = non_empty(&self.lookup, "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI") {
            format!("{}{}", self.container_host.trim_end_matches('/'), relative)
        } else if let Some(full) = non_empty(&self.lookup, "AWS_CONTAINER_CREDENTIALS_FULL_URI") {
            full
        } else {
            return Ok(None);
        };

        let mut request = self.client.get(&url);
        if let Some(token) = self.container_token()? {
            request = request.header("authorization", token);
        }

        fetch_temporary(request, CredentialSource::Container).await.map(Some)
    }

    fn container_token(&self) -> Result<Option<String>> {
        if let Some(token) = non_empty(&self.lookup, "AWS_CONTAINER_AUTHORIZATION_TOKEN") {
            return Ok(Some(token));
        }

        match non_empty(&self.lookup, "AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE") {
            Some(path) => std::fs::read_to_string(&path)
                .map(|token| Some(token.trim().to_string()))
                .map_err(|e| ProviderError::Credentials(format!("failed to read {}: {}", path, e))),
            None => Ok(None),
        }
    }

    async fn instance_credentials(&self) -> Result<Option<AwsCredentials>> {
        let disabled = non_empty(&self.lookup, "AWS_EC2_METADATA_DISABLED")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if disabled {
            return Ok(None);
        }

        let endpoint = non_empty(&self.lookup, "AWS_EC2_METADATA_SERVICE_ENDPOINT")
            .unwrap_or_else(|| IMDS_ENDPOINT.to_string());
        let base = endpoint.trim_end_matches('/');

        let token_resp = match self
            .client
            .put(format!("{}/latest/api/token", base))
            .header(IMDS_TTL_HEADER, IMDS_TOKEN_TTL_SECS)
            .send()
            .await
        {
            Ok(resp) => resp,
            // not on EC2
            Err(e) if e.is_connect() || e.is_timeout() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !token_resp.status().is_success() {
            return Err(ProviderError::Credentials(format!(
                "instance metadata token request returned status {}",
                token_resp.status().as_u16()
            )));
        }
        let token = token_resp.text().await?;

        let roles_url = format!("{}/latest/meta-data/iam/security-credentials/", base);
        let roles_resp = self
            .client
            .get(&roles_url)
            .header(IMDS_TOKEN_HEADER, &token)
            .send()
            .await?;
        if roles_resp.status() == reqwest::StatusCode::NOT_FOUND {
            // no instance profile attached
            return Ok(None);
        }
        if !roles_resp.status().is_success() {
            return Err(ProviderError::Credentials(format!(
                "instance metadata role lookup returned status {}",
                roles_resp.status().as_u16()
            )));
        }
        let roles = roles_resp.text().await?;
        let Some(role) = roles.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return Ok(None);
        };

        let request = self
            .client
            .get(format!("{}{}", roles_url, role))
            .header(IMDS_TOKEN_HEADER, &token);
        fetch_temporary(request, CredentialSource::InstanceMetadata).await.map(Some)
    }
}

// ============================================================================
// Cache
// ============================================================================

struct CacheState {
    current: Option<(AwsCredentials, CredentialSource)>,
    last_failure: Option<(DateTime<Utc>, String)>,
}

/// Credentials for signing: either fixed, or resolved through the default
/// chain and refreshed before expiry.
pub struct CredentialsCache {
    chain: Option<DefaultCredentialsChain>,
    state: Mutex<CacheState>,
}

impl CredentialsCache {
    pub fn fixed(credentials: AwsCredentials) -> Self {
        Self {
            chain: None,
            state: Mutex::new(CacheState {
                current: Some((credentials, CredentialSource::Static)),
                last_failure: None,
            }),
        }
    }

    pub fn from_chain(chain: DefaultCredentialsChain) -> Self {
        Self {
            chain: Some(chain),
            state: Mutex::new(CacheState {
                current: None,
                last_failure: None,
            }),
        }
    }

    pub async fn credentials(&self) -> Result<AwsCredentials> {
        self.credentials_at(Utc::now()).await
    }

    /// Cached credentials unless they expire within the refresh window of
    /// `now`. A failed refresh keeps serving unexpired credentials.
    pub async fn credentials_at(&self, now: DateTime<Utc>) -> Result<AwsCredentials> {
        let mut state = self.state.lock().await;

        if let Some((credentials, _)) = &state.current {
            if !credentials.expires_within(chrono::Duration::seconds(REFRESH_WINDOW_SECS), now) {
                return Ok(credentials.clone());
            }
        }

        let Some(chain) = &self.chain else {
            return match &state.current {
                Some((credentials, _)) if !credentials.is_expired(now) => Ok(credentials.clone()),
                _ => Err(ProviderError::Credentials("static credentials have expired".to_string())),
            };
        };

        if let Some((at, message)) = &state.last_failure {
            if now - *at < chrono::Duration::seconds(RETRY_AFTER_SECS) && state.current.is_none() {
                return Err(ProviderError::Credentials(message.clone()));
            }
        }

        match chain.resolve().await {
            Ok((credentials, source)) => {
                match credentials.expires_at {
                    Some(at) => log::info!("AWS credentials loaded from {} (expire {})", source, at),
                    None => log::info!("AWS credentials loaded from {}", source),
                }
                state.current = Some((credentials.clone(), source));
                state.last_failure = None;
                Ok(credentials)
            }
            Err(e) => {
                state.last_failure = Some((now, e.to_string()));
                match &state.current {
                    Some((credentials, source)) if !credentials.is_expired(now) => {
                        log::warn!("AWS credential refresh failed, reusing {} credentials: {}", source, e);
                        Ok(credentials.clone())
                    }
                    _ => Err(e),
                }
            }
        }
    }

    /// Where the cached credentials came from, if any are cached.
    pub async fn source(&self) -> Option<CredentialSource> {
        self.state.lock().await.current.as_ref().map(|(_, source)| *source)
    }
}

impl From<AwsCredentials> for CredentialsCache {
    fn from(credentials: AwsCredentials) -> Self {
        Self::fixed(credentials)
    }
}

impl From<DefaultCredentialsChain> for CredentialsCache {
    fn from(chain: DefaultCredentialsChain) -> Self {
        Self::from_chain(chain)
    }
}
