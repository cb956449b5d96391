//! Search Client
//!
//! HTTP client for the Solr suggestion core. Every request is logged with its
//! method, URL and elapsed time, and failures are classified so callers can
//! tell an unreachable backend from one that answered badly.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

use super::error::{Result, SearchError};
use super::models::{SearchRequest, SearchResponse, PING_OK};

// ============================================================================
// Backend Capability
// ============================================================================

/// What the suggestion pipeline needs from a search backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a select request. A non-zero header status is an error.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Health check against the ping handler.
    async fn ping(&self) -> Result<()>;
}

// ============================================================================
// Endpoint Configuration
// ============================================================================

/// One HTTP endpoint with its own timeouts.
#[derive(Debug, Clone)]
pub struct SearchEndpoint {
    pub url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl SearchEndpoint {
    pub fn new(url: impl Into<String>, connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            read_timeout,
        }
    }

    fn build_client(&self) -> Result<Client> {
        // a single solr host, so the idle pool is sized per host
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.read_timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .pool_max_idle_per_host(100)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SearchError::Client(e.to_string()))
    }
}

struct Connection {
    client: Client,
    url: Url,
}

impl Connection {
    fn new(endpoint: &SearchEndpoint) -> Result<Self> {
        Ok(Self {
            client: endpoint.build_client()?,
            url: Url::parse(&endpoint.url)?,
        })
    }
}

// ============================================================================
// Solr Client
// ============================================================================

/// Client holding separate connections for searches and health checks.
pub struct SolrClient {
    service: Connection,
    healthcheck: Connection,
}

impl SolrClient {
    pub fn new(service: &SearchEndpoint, healthcheck: &SearchEndpoint) -> Result<Self> {
        let client = Self {
            service: Connection::new(service)?,
            healthcheck: Connection::new(healthcheck)?,
        };

        log::info!("[SOLR] service url     = [{}]", client.service.url);
        log::info!("[SOLR] healthcheck url = [{}]", client.healthcheck.url);

        Ok(client)
    }

    pub fn service_url(&self) -> &str {
        self.service.url.as_str()
    }

    pub fn healthcheck_url(&self) -> &str {
        self.healthcheck.url.as_str()
    }

    /// Issue a GET and decode the response envelope.
    async fn get(&self, conn: &Connection, url: Url) -> Result<SearchResponse> {
        let base = conn.url.to_string();

        let start = Instant::now();
        let sent = conn.client.get(url).send().await;
        let elapsed_ms = start.elapsed().as_millis();

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                let reason = classify_transport_error(&e, &base);
                log::error!(
                    "Failed response from GET {} - {}. Elapsed Time: {} (ms)",
                    base,
                    reason,
                    elapsed_ms
                );
                return Err(SearchError::Unavailable { url: base, reason });
            }
        };

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            let reason = classify_transport_error(&e, &base);
            log::error!("Failed reading body from GET {} - {}", base, reason);
            SearchError::Unavailable {
                url: base.clone(),
                reason,
            }
        })?;

        let decoded: SearchResponse = serde_json::from_slice(&body).map_err(|e| {
            log::error!(
                "Failed response from GET {} - {}:{}. Elapsed Time: {} (ms)",
                base,
                status.as_u16(),
                e,
                elapsed_ms
            );
            SearchError::Malformed {
                url: base.clone(),
                message: format!("HTTP {}: {}", status.as_u16(), e),
            }
        })?;

        log::info!(
            "Successful Solr response from GET {}. Elapsed Time: {} (ms)",
            base,
            elapsed_ms
        );

        let header = &decoded.response_header;
        if header.status != 0 {
            log::warn!(
                "[SOLR] res: header: {{ status = {}, QTime = {} }}, error: {{ code = {}, msg = {} }}",
                header.status,
                header.q_time,
                decoded.error.code,
                decoded.error.msg
            );
            return Err(SearchError::Backend {
                code: decoded.error.code,
                message: decoded.error.msg,
            });
        }

        Ok(decoded)
    }
}

#[async_trait]
impl SearchBackend for SolrClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut url = self.service.url.clone();
        url.query_pairs_mut()
            .extend_pairs(request.query_pairs().iter().map(|(k, v)| (*k, v.as_str())));

        log::debug!("[SOLR] GET req: [{}]", url);

        let res = self.get(&self.service, url).await?;

        log::debug!(
            "[SOLR] res: header: {{ status = {}, QTime = {} }}, {{ start = {}, rows = {}, total = {}, maxScore = {:.2} }}",
            res.response_header.status,
            res.response_header.q_time,
            res.response.start,
            res.response.docs.len(),
            res.response.num_found,
            res.response.max_score
        );

        Ok(res)
    }

    async fn ping(&self) -> Result<()> {
        let res = self.get(&self.healthcheck, self.healthcheck.url.clone()).await?;

        log::debug!("[SOLR] ping status: {}", res.status);

        if res.status != PING_OK {
            return Err(SearchError::Unhealthy(res.status));
        }

        Ok(())
    }
}

/// Convert a reqwest error to a short operator-facing reason.
fn classify_transport_error(e: &reqwest::Error, url: &str) -> String {
    if e.is_timeout() {
        format!("{} timed out", url)
    } else if e.is_connect() {
        format!("{} refused connection", url)
    } else {
        e.to_string()
    }
}
