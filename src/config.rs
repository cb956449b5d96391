use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::search::SearchEndpoint;
use crate::core::suggest::{RetrievalParams, SuggestSettings};

/// Prefix for environment overrides, e.g. `SUGGESTOR_SERVICE__PORT=9090`.
pub const ENV_PREFIX: &str = "SUGGESTOR_";
/// Environment variable naming the TOML file to load.
pub const CONFIG_PATH_ENV: &str = "SUGGESTOR_CONFIG";
/// Shortcut for overriding `solr.host` alone.
pub const SOLR_HOST_ENV: &str = "SUGGESTOR_SOLR_HOST";
pub const DEFAULT_CONFIG_FILE: &str = "suggestor.toml";

/// Shortest connect or read timeout, in seconds.
const MIN_TIMEOUT_SECS: u64 = 1;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub solr: SolrConfig,
    pub suggestions: SuggestionsConfig,
    pub filter: FilterConfig,
    pub verify: VerifyConfig,
    pub ai: AiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Solr
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrConfig {
    pub host: String,
    pub core: String,
    pub clients: SolrClients,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8983/solr".to_string(),
            core: "suggestor".to_string(),
            clients: SolrClients::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrClients {
    pub service: ClientConfig,
    pub healthcheck: ClientConfig,
}

impl Default for SolrClients {
    fn default() -> Self {
        Self {
            service: ClientConfig::new("select"),
            healthcheck: ClientConfig::new("admin/ping"),
        }
    }
}

/// One outbound HTTP client. Timeouts are whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub conn_timeout: u64,
    pub read_timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("select")
    }
}

impl ClientConfig {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            conn_timeout: 5,
            read_timeout: 20,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        seconds(self.conn_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        seconds(self.read_timeout)
    }
}

impl SolrConfig {
    /// `{host}/{core}/{endpoint}`
    pub fn url_for(&self, client: &ClientConfig) -> String {
        format!(
            "{}/{}/{}",
            self.host.trim_end_matches('/'),
            self.core.trim_matches('/'),
            client.endpoint.trim_start_matches('/')
        )
    }

    pub fn service_endpoint(&self) -> SearchEndpoint {
        self.endpoint(&self.clients.service)
    }

    pub fn healthcheck_endpoint(&self) -> SearchEndpoint {
        self.endpoint(&self.clients.healthcheck)
    }

    fn endpoint(&self, client: &ClientConfig) -> SearchEndpoint {
        SearchEndpoint::new(
            self.url_for(client),
            client.connect_timeout(),
            client.request_timeout(),
        )
    }
}

// ============================================================================
// Suggestions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub author: AuthorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    /// Most confident suggestions returned.
    pub limit: usize,
    /// Candidates fetched per retrieval.
    pub rows: u32,
    pub params: SolrParams,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            rows: 100,
            params: SolrParams::default(),
        }
    }
}

/// Select handler parameters, forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrParams {
    pub deftype: String,
    pub fl: Vec<String>,
    pub fq: Vec<String>,
    pub qf: String,
    pub sort: String,
}

impl Default for SolrParams {
    fn default() -> Self {
        Self {
            deftype: "edismax".to_string(),
            fl: vec!["phrase".to_string(), "score".to_string()],
            fq: vec!["type:author".to_string()],
            qf: "phrase".to_string(),
            sort: "score desc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Outlier multiplier: cutoff = mean + k * stddev.
    pub k: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { k: 2.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Cap on concurrent verification queries; unset is one per term.
    pub max_concurrency: Option<usize>,
}

// ============================================================================
// AI
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// `bedrock`, or blank / `none` to disable refinement.
    pub provider: String,
    pub model: String,
    pub region: Option<String>,
    /// Runtime base URL override.
    pub endpoint: Option<String>,
    /// Prompt template with `$QUERY` and `$RESULTS` placeholders.
    pub prompt: Option<String>,
    pub conn_timeout: u64,
    pub read_timeout: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "bedrock".to_string(),
            model: "google.gemma-3-4b-it".to_string(),
            region: None,
            endpoint: None,
            prompt: None,
            conn_timeout: 5,
            read_timeout: 60,
        }
    }
}

impl AiConfig {
    pub fn connect_timeout(&self) -> Duration {
        seconds(self.conn_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        seconds(self.read_timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// JSON lines on stdout instead of the pretty format.
    pub json: bool,
    /// Directory for daily-rolling JSON log files.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

fn seconds(value: u64) -> Duration {
    Duration::from_secs(value.max(MIN_TIMEOUT_SECS))
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Defaults, then the TOML file named by `SUGGESTOR_CONFIG` (or
    /// `suggestor.toml`), then `SUGGESTOR_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// The TOML file [`load`](Self::load) reads: `SUGGESTOR_CONFIG`, else
    /// `suggestor.toml`.
    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// One-line description of where settings came from, for the startup log.
    /// Logged by the caller once logging is initialized.
    pub fn describe_source(path: &Path) -> String {
        if path.exists() {
            format!("config file {} + {}* environment", path.display(), ENV_PREFIX)
        } else {
            format!(
                "defaults + {}* environment (no config file at {})",
                ENV_PREFIX,
                path.display()
            )
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: AppConfig = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider chain, exposed for inspection and tests.
    pub fn figment(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["CONFIG", "SOLR_HOST"])
                    .split("__"),
            );

        if let Some(host) = std::env::var(SOLR_HOST_ENV).ok().filter(|h| !h.trim().is_empty()) {
            figment = figment.merge(("solr.host", host));
        }

        figment
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.filter.k.is_finite() || self.filter.k < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "filter.k must be a non-negative number, got {}",
                self.filter.k
            )));
        }
        if self.solr.host.trim().is_empty() {
            return Err(ConfigError::Invalid("solr.host is empty".to_string()));
        }
        if self.solr.core.trim().is_empty() {
            return Err(ConfigError::Invalid("solr.core is empty".to_string()));
        }
        Ok(())
    }

    pub fn suggest_settings(&self) -> SuggestSettings {
        let author = &self.suggestions.author;
        SuggestSettings {
            params: RetrievalParams {
                def_type: author.params.deftype.clone(),
                fl: author.params.fl.clone(),
                fq: author.params.fq.clone(),
                qf: author.params.qf.clone(),
                sort: author.params.sort.clone(),
                rows: author.rows,
            },
            limit: author.limit,
            k: self.filter.k,
            max_concurrency: self.verify.max_concurrency,
        }
    }

    /// Render as TOML, e.g. to seed a config file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
