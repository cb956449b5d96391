
pub mod logging;
pub mod llm;

// Catalog query syntax and eligibility
pub mod query;

// Solr wire client
pub mod search;

// Retrieval, confidence filter, verification and the service tying them together
pub mod suggest;
