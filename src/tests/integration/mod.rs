//! Integration tests
//!
//! The pipeline wired to real HTTP clients, with Solr and Bedrock replaced
//! by wiremock servers.

mod bedrock_provider;
mod solr_client;
mod suggestion_pipeline;
