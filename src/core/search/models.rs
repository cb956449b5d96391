//! Search Backend Models
//!
//! Request parameters and response envelopes for the Solr select and ping
//! handlers.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

/// Parameters for a single select request.
///
/// Optional values that are empty are left off the wire entirely so the
/// handler's own defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    pub start: u32,
    pub rows: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub def_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fl: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fq: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub qf: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort: String,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    /// Flatten into `(name, value)` query pairs, repeating `fl` and `fq`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.q.clone()),
            ("start", self.start.to_string()),
            ("rows", self.rows.to_string()),
        ];

        if !self.sort.is_empty() {
            pairs.push(("sort", self.sort.clone()));
        }
        if !self.def_type.is_empty() {
            pairs.push(("defType", self.def_type.clone()));
        }
        if !self.qf.is_empty() {
            pairs.push(("qf", self.qf.clone()));
        }
        for field in &self.fl {
            pairs.push(("fl", field.clone()));
        }
        for filter in &self.fq {
            pairs.push(("fq", filter.clone()));
        }

        pairs
    }
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseHeader {
    pub status: i64,
    #[serde(rename = "QTime")]
    pub q_time: i64,
}

/// A single phrase record from the suggestion core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDocument {
    pub phrase: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub count: i64,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDocuments {
    #[serde(rename = "numFound")]
    pub num_found: u64,
    pub start: u64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    pub docs: Vec<SearchDocument>,
}

/// Error object reported by the backend when a request fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendErrorBody {
    pub metadata: Vec<String>,
    pub msg: String,
    pub code: i64,
}

/// Full select/ping response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[serde(rename = "responseHeader")]
    pub response_header: ResponseHeader,
    pub response: SearchDocuments,
    pub error: BackendErrorBody,
    /// Only populated by the ping handler.
    pub status: String,
}

/// Status string the ping handler reports when the core is healthy.
pub const PING_OK: &str = "OK";
