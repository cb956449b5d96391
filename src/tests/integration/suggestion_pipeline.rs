//! End-to-end suggestion scenarios
//!
//! Real `SolrClient` against wiremock, with a scripted AI provider.

use std::sync::Arc;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::llm::AIRefiner;
use crate::core::search::SearchBackend;
use crate::core::suggest::{SuggestSettings, SuggestionService};
use crate::tests::common::{fixtures, select_path, solr_client, unreachable_solr_client};
use crate::tests::mocks::{Script, ScriptedProvider};

async fn mount_retrieval(server: &MockServer, scored: &[(&str, f64)]) {
    Mock::given(method("GET"))
        .and(path(select_path()))
        .and(query_param("rows", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::solr_docs(scored)))
        .mount(server)
        .await;
}

async fn mount_count(server: &MockServer, term: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(select_path()))
        .and(query_param("rows", "0"))
        .and(query_param("q", term))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::solr_count(hits)))
        .expect(1)
        .mount(server)
        .await;
}

fn service(backend: impl SearchBackend + 'static) -> SuggestionService {
    SuggestionService::new(Arc::new(backend), SuggestSettings::default())
}

#[tokio::test]
async fn twain_without_ai_is_empty() {
    let server = MockServer::start().await;
    mount_retrieval(&server, &fixtures::twain_candidates()).await;

    let response = service(solr_client(&server.uri())).suggest("twain", true).await;
    assert!(response.is_empty());
}

#[tokio::test]
async fn clear_outlier_without_ai() {
    let server = MockServer::start().await;
    mount_retrieval(&server, &fixtures::outlier_candidates()).await;

    let response = service(solr_client(&server.uri())).suggest("twain", false).await;
    assert_eq!(response.values(), vec!["Twain, Mark"]);
}

#[tokio::test]
async fn ineligible_query_never_reaches_solr() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::solr_count(0)))
        .expect(0)
        .mount(&server)
        .await;

    let service = service(solr_client(&server.uri()));
    for raw in ["", "*", "title: {huckleberry finn}", "keyword: {a} OR keyword: {b}", "(twain"] {
        assert!(service.suggest(raw, false).await.is_empty(), "{raw:?}");
    }
}

#[tokio::test]
async fn verified_ai_terms_in_order() {
    let server = MockServer::start().await;
    mount_retrieval(&server, &fixtures::twain_candidates()).await;
    mount_count(&server, "Twain, Mark", 212).await;
    mount_count(&server, "Clemens, Samuel", 14).await;

    let provider = ScriptedProvider::proposing(&["Twain, Mark", "Clemens, Samuel"]);
    let service = service(solr_client(&server.uri()))
        .with_refiner(Some(AIRefiner::new(provider.clone())));

    let response = service.suggest("twain", false).await;
    assert_eq!(response.values(), vec!["Twain, Mark", "Clemens, Samuel"]);
    assert!(response.suggestions.iter().all(|s| s.kind == "author"));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "twain");
    assert!(calls[0].existing.is_empty());
    assert!(calls[0].prompt.contains("No author suggestions were found"));
}

#[tokio::test]
async fn unverified_ai_terms_are_dropped() {
    let server = MockServer::start().await;
    mount_retrieval(&server, &fixtures::outlier_candidates()).await;
    mount_count(&server, "Twain, Mark", 212).await;
    mount_count(&server, "Twine, Marcus", 0).await;

    let provider = ScriptedProvider::proposing(&["Twain, Mark", "Twine, Marcus", "Twain, Mark"]);
    let service = service(solr_client(&server.uri()))
        .with_refiner(Some(AIRefiner::new(provider.clone())));

    let response = service.suggest("twain", false).await;
    assert_eq!(response.values(), vec!["Twain, Mark"]);
    assert_eq!(provider.calls()[0].existing, vec!["Twain, Mark"]);
}

#[tokio::test]
async fn backend_down_fails_open() {
    let provider = ScriptedProvider::proposing(&["Twain, Mark", "Clemens, Samuel"]);
    let service = service(unreachable_solr_client())
        .with_refiner(Some(AIRefiner::new(provider.clone())));

    let response = service.suggest("twain", false).await;
    assert_eq!(response.values(), vec!["Twain, Mark", "Clemens, Samuel"]);
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn provider_failure_returns_baseline() {
    let server = MockServer::start().await;
    mount_retrieval(&server, &fixtures::outlier_candidates()).await;

    for script in [Script::EmptyContent, Script::Status(429)] {
        let service = service(solr_client(&server.uri()))
            .with_refiner(Some(AIRefiner::new(ScriptedProvider::new(script))));
        assert_eq!(service.suggest("twain", false).await.values(), vec!["Twain, Mark"]);
    }
}

#[tokio::test]
async fn ai_sees_raw_query_even_when_ineligible() {
    let server = MockServer::start().await;
    let provider = ScriptedProvider::proposing(&[]);
    let service = service(solr_client(&server.uri()))
        .with_refiner(Some(AIRefiner::new(provider.clone())));

    assert!(service.suggest("title: {tom sawyer}", false).await.is_empty());
    assert_eq!(provider.calls()[0].query, "title: {tom sawyer}");
}

#[tokio::test]
async fn author_endpoint_ignores_ai() {
    let server = MockServer::start().await;
    mount_retrieval(&server, &fixtures::outlier_candidates()).await;

    let provider = ScriptedProvider::proposing(&["Clemens, Samuel"]);
    let service = service(solr_client(&server.uri()))
        .with_refiner(Some(AIRefiner::new(provider.clone())));

    let response = service.author_suggestions("twain", false).await;
    assert_eq!(response.values(), vec!["Twain, Mark"]);
    assert!(provider.calls().is_empty());
}
