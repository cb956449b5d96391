//! Crate-level tests
//!
//! - `common`: Solr and Bedrock response fixtures, client builders
//! - `mocks`: hand-written fakes for the pipeline's capabilities
//! - `property`: proptest invariants for the filter and query parser
//! - `integration`: the pipeline against wiremock-served backends

mod common;
mod integration;
mod mocks;
