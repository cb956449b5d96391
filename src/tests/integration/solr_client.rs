//! Solr client against a wiremock server

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::search::{SearchBackend, SearchError, SearchRequest};
use crate::tests::common::{fixtures, ping_path, select_path, solr_client, unreachable_solr_client};

#[tokio::test]
async fn search_sends_params_and_decodes_docs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(select_path()))
        .and(query_param("q", "twain"))
        .and(query_param("start", "0"))
        .and(query_param("rows", "100"))
        .and(query_param("defType", "edismax"))
        .and(query_param("qf", "phrase"))
        .and(query_param("sort", "score desc"))
        .and(query_param("fq", "type:author"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::solr_docs(&fixtures::twain_candidates())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = SearchRequest {
        def_type: "edismax".to_string(),
        qf: "phrase".to_string(),
        sort: "score desc".to_string(),
        fl: vec!["phrase".to_string(), "score".to_string()],
        fq: vec!["type:author".to_string()],
        ..SearchRequest::new("twain").with_rows(100)
    };

    let response = solr_client(&server.uri()).search(&request).await.unwrap();
    assert_eq!(response.response.num_found, 3);
    assert_eq!(response.response.docs[0].phrase, "Twain, Mark");
    assert_eq!(response.response.docs[0].score, 95.0);
}

#[tokio::test]
async fn header_status_is_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(select_path()))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(fixtures::solr_error(400, "undefined field: bogus")),
        )
        .mount(&server)
        .await;

    let err = solr_client(&server.uri())
        .search(&SearchRequest::new("twain"))
        .await
        .unwrap_err();

    match err {
        SearchError::Backend { code, message } => {
            assert_eq!(code, 400);
            assert_eq!(message, "undefined field: bogus");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(select_path()))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = solr_client(&server.uri())
        .search(&SearchRequest::new("twain"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Malformed { .. }));
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    let err = unreachable_solr_client()
        .search(&SearchRequest::new("twain"))
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn ping_requires_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ping_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::ping_ok()))
        .mount(&server)
        .await;

    assert!(solr_client(&server.uri()).ping().await.is_ok());

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ping_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "responseHeader": { "status": 0, "QTime": 0 }, "status": "DISABLED" }),
        ))
        .mount(&server)
        .await;

    let err = solr_client(&server.uri()).ping().await.unwrap_err();
    assert!(matches!(err, SearchError::Unhealthy(ref s) if s == "DISABLED"));
}
