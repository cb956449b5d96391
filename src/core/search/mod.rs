//! Search Backend Module
//!
//! Wire client and models for the Solr core that holds author phrases.

pub mod client;
pub mod error;
pub mod models;

pub use client::{SearchBackend, SearchEndpoint, SolrClient};
pub use error::{Result, SearchError};
pub use models::{SearchDocument, SearchRequest, SearchResponse, PING_OK};

#[cfg(test)]
pub use client::MockSearchBackend;
