//! Shared test helpers

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::llm::credentials::Lookup;
use crate::core::search::{SearchEndpoint, SolrClient};

/// Solr core path served by the wiremock server.
pub const CORE_PATH: &str = "/solr/test_core";

pub fn select_path() -> String {
    format!("{}/select", CORE_PATH)
}

pub fn ping_path() -> String {
    format!("{}/admin/ping", CORE_PATH)
}

/// A client pointed at `base` (a wiremock `uri()`).
pub fn solr_client(base: &str) -> SolrClient {
    let timeout = Duration::from_secs(2);
    SolrClient::new(
        &SearchEndpoint::new(format!("{}{}", base, select_path()), timeout, timeout),
        &SearchEndpoint::new(format!("{}{}", base, ping_path()), timeout, timeout),
    )
    .expect("valid test endpoints")
}

/// A client whose endpoints refuse connections.
pub fn unreachable_solr_client() -> SolrClient {
    solr_client("http://127.0.0.1:9")
}

/// AWS environment with no shared files and instance metadata off, plus
/// `pairs`.
pub fn aws_env(pairs: &[(&str, &str)]) -> Lookup {
    let mut map: HashMap<String, String> = HashMap::from([
        ("AWS_CONFIG_FILE".to_string(), "/nonexistent/config".to_string()),
        ("AWS_SHARED_CREDENTIALS_FILE".to_string(), "/nonexistent/credentials".to_string()),
        ("AWS_EC2_METADATA_DISABLED".to_string(), "true".to_string()),
    ]);
    map.extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Arc::new(move |key: &str| map.get(key).cloned())
}
