//! Response bodies in the shapes Solr and Bedrock produce.

#![allow(dead_code)]

use serde_json::{json, Value};

/// A select response carrying `(phrase, score)` docs.
pub fn solr_docs(scored: &[(&str, f64)]) -> Value {
    let max_score = scored.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
    let docs: Vec<Value> = scored
        .iter()
        .map(|(phrase, score)| json!({ "phrase": phrase, "type": "author", "score": score }))
        .collect();

    json!({
        "responseHeader": { "status": 0, "QTime": 3 },
        "response": {
            "numFound": scored.len(),
            "start": 0,
            "maxScore": max_score,
            "docs": docs,
        }
    })
}

/// A count-only select response.
pub fn solr_count(num_found: u64) -> Value {
    json!({
        "responseHeader": { "status": 0, "QTime": 1 },
        "response": { "numFound": num_found, "start": 0, "docs": [] }
    })
}

pub fn solr_error(code: i64, msg: &str) -> Value {
    json!({
        "responseHeader": { "status": code, "QTime": 0 },
        "error": {
            "metadata": ["error-class", "org.apache.solr.common.SolrException"],
            "msg": msg,
            "code": code
        }
    })
}

pub fn ping_ok() -> Value {
    json!({ "responseHeader": { "status": 0, "QTime": 0 }, "status": "OK" })
}

/// Three candidates, none an outlier at k=2.
pub fn twain_candidates() -> Vec<(&'static str, f64)> {
    vec![
        ("Twain, Mark", 95.0),
        ("Twain Studies Journal", 20.0),
        ("American Lit", 5.0),
    ]
}

/// One dominant candidate among weak ones.
pub fn outlier_candidates() -> Vec<(&'static str, f64)> {
    vec![
        ("Twain, Mark", 100.0),
        ("Twain, Shania", 10.0),
        ("Twain, Sadie", 10.0),
        ("Twain Society", 10.0),
        ("Twain, Anne", 10.0),
    ]
}

/// Anthropic-on-Bedrock reply wrapping `text`.
pub fn anthropic_reply(text: &str) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

/// Gemma-on-Bedrock reply wrapping `text`.
pub fn gemma_reply(text: &str) -> Value {
    json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    })
}

/// Container or instance-metadata credentials body.
pub fn temporary_credentials(access_key_id: &str, token: &str, expires_in_secs: i64) -> Value {
    let expiration = chrono::Utc::now() + chrono::Duration::seconds(expires_in_secs);
    json!({
        "Code": "Success",
        "Type": "AWS-HMAC",
        "AccessKeyId": access_key_id,
        "SecretAccessKey": "temporary-secret",
        "Token": token,
        "Expiration": expiration.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}
