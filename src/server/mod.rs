//! HTTP Service
//!
//! Axum router exposing the suggestion pipeline:
//! - `POST /api/suggest`: full pipeline
//! - `POST /api/suggest/author`: catalog suggestions only
//! - `GET /healthcheck`, `GET /version`

pub mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::core::llm::{self, AIRefiner};
use crate::core::search::{SearchBackend, SearchError, SolrClient};
use crate::core::suggest::SuggestionService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SuggestionService>,
}

impl AppState {
    pub fn new(service: SuggestionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Wire the Solr client, the optional AI provider and the pipeline from
/// configuration. A provider that cannot be built (unknown name, no region)
/// is logged and skipped. AWS credentials resolve on the first request.
pub fn build_state(config: &AppConfig) -> Result<AppState, SearchError> {
    let solr = SolrClient::new(
        &config.solr.service_endpoint(),
        &config.solr.healthcheck_endpoint(),
    )?;

    let backend: Arc<dyn SearchBackend> = Arc::new(solr);

    let refiner = match llm::from_config(&config.ai) {
        Ok(Some(provider)) => {
            log::info!(
                "AI refinement enabled: {} ({})",
                provider.name(),
                provider.model()
            );
            Some(AIRefiner::new(provider).with_template(config.ai.prompt.clone()))
        }
        Ok(None) => {
            log::info!("AI refinement disabled");
            None
        }
        Err(e) => {
            log::warn!("AI provider unavailable, continuing without it: {}", e);
            None
        }
    };

    let service =
        SuggestionService::new(backend, config.suggest_settings()).with_refiner(refiner);
    Ok(AppState::new(service))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ignore))
        .route("/favicon.ico", get(handlers::ignore))
        .route("/version", get(handlers::version))
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/api/suggest", post(handlers::suggest))
        .route("/api/suggest/author", post(handlers::author_suggest))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("suggestion service listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            log::info!("suggestion service shutting down");
        })
        .await
}
