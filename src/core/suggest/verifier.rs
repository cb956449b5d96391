//! Proposal Verification
//!
//! Confirms each AI-proposed term returns at least one hit before it is
//! shown. Checks fan out as independent tasks, each writing only its own
//! result slot. Any failure counts as valid: an unreachable backend must not
//! hide AI suggestions.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::retriever::RetrievalParams;
use super::types::VerificationResult;
use crate::core::search::SearchBackend;

pub struct Verifier {
    backend: Arc<dyn SearchBackend>,
    params: RetrievalParams,
    max_concurrency: Option<usize>,
}

impl Verifier {
    pub fn new(backend: Arc<dyn SearchBackend>, params: RetrievalParams) -> Self {
        Self {
            backend,
            params,
            max_concurrency: None,
        }
    }

    /// Bound in-flight checks. `None` or `Some(0)` runs one task per term.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|n| *n > 0);
        self
    }

    /// One result per distinct term, in first-occurrence order.
    ///
    /// Dropping the returned future aborts all in-flight checks.
    pub async fn verify(&self, terms: &[String]) -> Vec<VerificationResult> {
        let distinct = distinct_terms(terms);
        if distinct.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let semaphore = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut slots: Vec<Option<bool>> = vec![None; distinct.len()];
        let mut tasks = JoinSet::new();

        for (idx, term) in distinct.iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let request = self.params.count_request(term);
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let _permit = match semaphore {
                    Some(s) => s.acquire_owned().await.ok(),
                    None => None,
                };
                (idx, backend.search(&request).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(response))) => {
                    slots[idx] = Some(response.response.num_found > 0);
                }
                Ok((idx, Err(e))) => {
                    log::warn!(
                        "verification of {:?} failed, keeping it: {}",
                        distinct[idx],
                        e
                    );
                    slots[idx] = Some(true);
                }
                Err(e) => {
                    // slot stays empty and is treated as valid below
                    log::warn!("verification task did not complete: {}", e);
                }
            }
        }

        let results: Vec<VerificationResult> = distinct
            .into_iter()
            .zip(slots)
            .map(|(term, valid)| VerificationResult {
                valid: valid.unwrap_or(true),
                term,
            })
            .collect();

        log::debug!(
            "verified {} term(s), {} valid, in {} ms",
            results.len(),
            results.iter().filter(|r| r.valid).count(),
            start.elapsed().as_millis()
        );

        results
    }
}

fn distinct_terms(terms: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}
