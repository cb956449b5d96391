//! Bedrock Provider Implementation
//!
//! Invokes a model hosted on AWS Bedrock runtime. The payload dialect is
//! chosen from the model id, and every request is SigV4 signed.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

use crate::core::llm::dialect::ModelDialect;
use crate::core::llm::prompt::{default_prompt, SYSTEM_PROMPT};
use crate::core::llm::provider::{AIProposal, AIProvider, ProviderError, Result};
use crate::core::llm::response::parse_proposal;
use crate::core::llm::credentials::CredentialsCache;
use crate::core::llm::signing::{uri_encode, SigV4Signer};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

const SERVICE: &str = "bedrock";
const CONTENT_TYPE: &str = "application/json";

/// Settings needed to construct a [`BedrockProvider`].
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub model: String,
    pub region: String,
    /// Override for the runtime base URL (tests, VPC endpoints).
    pub endpoint: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl BedrockConfig {
    pub fn new(model: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            region: region.into(),
            endpoint: None,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}

/// Bedrock runtime provider
pub struct BedrockProvider {
    model: String,
    dialect: ModelDialect,
    invoke_url: Url,
    host: String,
    client: Client,
    signer: SigV4Signer,
    credentials: CredentialsCache,
}

impl BedrockProvider {
    /// `credentials` is either fixed [`AwsCredentials`](crate::core::llm::signing::AwsCredentials)
    /// or a [`DefaultCredentialsChain`](crate::core::llm::credentials::DefaultCredentialsChain).
    pub fn new(config: BedrockConfig, credentials: impl Into<CredentialsCache>) -> Result<Self> {
        let model = if config.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model.trim().to_string()
        };

        if config.region.trim().is_empty() {
            return Err(ProviderError::config("no AWS region configured"));
        }

        let base = config.endpoint.clone().unwrap_or_else(|| {
            format!("https://bedrock-runtime.{}.amazonaws.com", config.region)
        });
        let invoke_url = Url::parse(&format!(
            "{}/model/{}/invoke",
            base.trim_end_matches('/'),
            uri_encode(&model)
        ))
        .map_err(|e| ProviderError::config(format!("invalid bedrock endpoint {base}: {e}")))?;

        let host = match (invoke_url.host_str(), invoke_url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(ProviderError::config(format!(
                    "bedrock endpoint has no host: {invoke_url}"
                )))
            }
        };

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()?;

        let dialect = ModelDialect::classify(&model);
        log::info!(
            "Bedrock provider ready: model={} dialect={} region={}",
            model,
            dialect.as_str(),
            config.region
        );

        Ok(Self {
            dialect,
            signer: SigV4Signer::new(config.region, SERVICE),
            credentials: credentials.into(),
            model,
            invoke_url,
            host,
            client,
        })
    }

    pub fn dialect(&self) -> ModelDialect {
        self.dialect
    }

    pub fn invoke_url(&self) -> &str {
        self.invoke_url.as_str()
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = self.dialect.request_body(SYSTEM_PROMPT, prompt)?;
        let credentials = self.credentials.credentials().await?;
        let signed = self.signer.sign_post(
            &credentials,
            &self.host,
            self.invoke_url.path(),
            CONTENT_TYPE,
            &body,
            chrono::Utc::now(),
        );

        let mut request = self
            .client
            .post(self.invoke_url.clone())
            .header("content-type", CONTENT_TYPE);
        for (name, value) in signed.pairs() {
            request = request.header(name, value);
        }

        let start = Instant::now();
        let resp = request.body(body).send().await?;
        let status = resp.status();
        let latency = start.elapsed().as_millis();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            log::warn!(
                "[BEDROCK] {} returned status {} after {} ms",
                self.model,
                status.as_u16(),
                latency
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let bytes = resp.bytes().await?;
        log::debug!("[BEDROCK] {} responded in {} ms", self.model, latency);

        self.dialect.extract_text(&bytes)
    }
}

#[async_trait]
impl AIProvider for BedrockProvider {
    async fn get_suggestions(
        &self,
        query: &str,
        custom_prompt: &str,
        existing_suggestions: &[String],
    ) -> Result<AIProposal> {
        let prompt = if custom_prompt.trim().is_empty() {
            default_prompt(query, existing_suggestions)
        } else {
            custom_prompt.to_string()
        };

        let content = self.invoke(&prompt).await?;
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        parse_proposal(&content)
    }

    fn name(&self) -> &str {
        "bedrock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
