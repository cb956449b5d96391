//! Candidate Retrieval
//!
//! Runs the configured author query against the search backend and turns
//! the hits into scored candidates.

use std::sync::Arc;
use std::time::Instant;

use super::types::Candidate;
use crate::core::search::{Result, SearchBackend, SearchRequest};

/// Default row cap for retrieval.
pub const DEFAULT_ROWS: u32 = 100;

/// Backend parameters forwarded verbatim on every retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalParams {
    pub def_type: String,
    pub fl: Vec<String>,
    pub fq: Vec<String>,
    pub qf: String,
    pub sort: String,
    pub rows: u32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            def_type: String::new(),
            fl: Vec::new(),
            fq: Vec::new(),
            qf: String::new(),
            sort: String::new(),
            rows: DEFAULT_ROWS,
        }
    }
}

impl RetrievalParams {
    /// Full select request for candidate retrieval.
    pub fn search_request(&self, term: &str) -> SearchRequest {
        SearchRequest {
            q: term.to_string(),
            start: 0,
            rows: self.rows,
            def_type: self.def_type.clone(),
            fl: self.fl.clone(),
            fq: self.fq.clone(),
            qf: self.qf.clone(),
            sort: self.sort.clone(),
        }
    }

    /// Count-only request for verification: no `qf`, `fl` or `fq`.
    pub fn count_request(&self, term: &str) -> SearchRequest {
        SearchRequest {
            q: term.to_string(),
            start: 0,
            rows: 0,
            def_type: self.def_type.clone(),
            sort: self.sort.clone(),
            ..Default::default()
        }
    }
}

pub struct CandidateRetriever {
    backend: Arc<dyn SearchBackend>,
}

impl CandidateRetriever {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Scored candidates in the order the backend ranked them. No hits is
    /// not an error.
    pub async fn retrieve(&self, term: &str, params: &RetrievalParams) -> Result<Vec<Candidate>> {
        let start = Instant::now();
        let response = self.backend.search(&params.search_request(term)).await?;

        let candidates: Vec<Candidate> = response
            .response
            .docs
            .into_iter()
            .map(|doc| Candidate::new(doc.phrase, doc.score))
            .collect();

        log::debug!(
            "retrieved {} candidate(s) of {} for {:?} in {} ms",
            candidates.len(),
            response.response.num_found,
            term,
            start.elapsed().as_millis()
        );

        Ok(candidates)
    }
}
