//! Suggestion Service
//!
//! Sequences parsing, retrieval, confidence filtering and the optional AI
//! refinement with verification. Every stage failure is recovered here: the
//! caller always gets a (possibly empty) suggestion list.

use std::sync::Arc;
use std::time::Instant;

use super::error::SuggestError;
use super::filter::{ConfidenceFilter, DEFAULT_K};
use super::retriever::{CandidateRetriever, RetrievalParams};
use super::types::{Suggestion, SuggestionResponse};
use super::verifier::Verifier;
use crate::core::llm::AIRefiner;
use crate::core::query::ParsedQuery;
use crate::core::search::{SearchBackend, SearchError};

/// Default number of confident suggestions returned.
pub const DEFAULT_LIMIT: usize = 5;

/// Tunables for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestSettings {
    pub params: RetrievalParams,
    pub limit: usize,
    pub k: f64,
    pub max_concurrency: Option<usize>,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            params: RetrievalParams::default(),
            limit: DEFAULT_LIMIT,
            k: DEFAULT_K,
            max_concurrency: None,
        }
    }
}

/// Baseline outcome: the parsed term (when eligible) and confident values.
struct Baseline {
    term: Option<String>,
    values: Vec<String>,
}

pub struct SuggestionService {
    backend: Arc<dyn SearchBackend>,
    retriever: CandidateRetriever,
    filter: ConfidenceFilter,
    verifier: Verifier,
    refiner: Option<AIRefiner>,
    params: RetrievalParams,
    limit: usize,
}

impl SuggestionService {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: SuggestSettings) -> Self {
        Self {
            retriever: CandidateRetriever::new(Arc::clone(&backend)),
            verifier: Verifier::new(Arc::clone(&backend), settings.params.clone())
                .with_max_concurrency(settings.max_concurrency),
            filter: ConfidenceFilter::new(settings.k),
            refiner: None,
            params: settings.params,
            limit: settings.limit,
            backend,
        }
    }

    pub fn with_refiner(mut self, refiner: Option<AIRefiner>) -> Self {
        self.refiner = refiner;
        self
    }

    /// Full pipeline: baseline, then AI refinement when configured.
    pub async fn suggest(&self, raw_query: &str, verbose: bool) -> SuggestionResponse {
        let baseline = self.baseline(raw_query, verbose).await;

        let Some(refiner) = &self.refiner else {
            return to_response(baseline.values);
        };

        let proposal = match refiner
            .refine(baseline.term.as_deref(), raw_query, &baseline.values, None)
            .await
        {
            Ok(proposal) => proposal,
            Err(e) => {
                let err = SuggestError::from(e);
                log::warn!(
                    "[{}] AI refinement failed for {:?}, returning baseline: {}",
                    err.kind(),
                    raw_query,
                    err
                );
                return to_response(baseline.values);
            }
        };

        if let Some(corrected) = &proposal.did_you_mean {
            log::info!("AI did-you-mean for {:?}: {:?}", raw_query, corrected);
        }

        let verified: Vec<String> = self
            .verifier
            .verify(&proposal.suggestions)
            .await
            .into_iter()
            .filter_map(|r| {
                if !r.valid {
                    log::debug!("dropping unverified AI term {:?}", r.term);
                }
                r.valid.then_some(r.term)
            })
            .collect();

        to_response(verified)
    }

    /// Confident catalog suggestions only, no AI.
    pub async fn author_suggestions(&self, raw_query: &str, verbose: bool) -> SuggestionResponse {
        to_response(self.baseline(raw_query, verbose).await.values)
    }

    /// Backend health.
    pub async fn ping(&self) -> Result<(), SearchError> {
        self.backend.ping().await
    }

    async fn baseline(&self, raw_query: &str, verbose: bool) -> Baseline {
        let term = match ParsedQuery::parse(raw_query) {
            Ok(parsed) => parsed.into_term(),
            Err(e) => {
                let err = SuggestError::from(e);
                log::info!("[{}] no author suggestions for {:?}: {}", err.kind(), raw_query, err);
                return Baseline {
                    term: None,
                    values: Vec::new(),
                };
            }
        };

        let start = Instant::now();
        let candidates = match self.retriever.retrieve(&term, &self.params).await {
            Ok(candidates) => candidates,
            Err(e) => {
                let err = SuggestError::from(e);
                log::warn!(
                    "[{}] retrieval failed for {:?} after {} ms: {}",
                    err.kind(),
                    term,
                    start.elapsed().as_millis(),
                    err
                );
                return Baseline {
                    term: Some(term),
                    values: Vec::new(),
                };
            }
        };

        let (confident, stats) = self.filter.filter_with_stats(&candidates, self.limit);

        if verbose {
            if let Some(stats) = stats {
                log::info!("score stats for {:?}: {}", term, stats);
            }
            for (i, c) in candidates.iter().enumerate() {
                log::info!("  candidate {:>3}: {:.4} {}", i + 1, c.score, c.phrase);
            }
        }

        Baseline {
            term: Some(term),
            values: confident.into_iter().map(|c| c.phrase).collect(),
        }
    }
}

fn to_response(values: Vec<String>) -> SuggestionResponse {
    SuggestionResponse::new(values.into_iter().map(Suggestion::author).collect())
}
