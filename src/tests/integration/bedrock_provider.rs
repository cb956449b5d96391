//! Bedrock provider against a wiremock runtime endpoint

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::core::llm::prompt::SYSTEM_PROMPT;
use crate::core::llm::signing::AwsCredentials;
use crate::core::llm::{AIProvider, BedrockConfig, BedrockProvider, ProviderError};
use crate::tests::common::fixtures;

const CLAUDE: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
const CLAUDE_PATH: &str = "/model/anthropic.claude-3-sonnet-20240229-v1%3A0/invoke";
const GEMMA: &str = "google.gemma-3-4b-it";
const GEMMA_PATH: &str = "/model/google.gemma-3-4b-it/invoke";

fn provider(server: &MockServer, model: &str) -> BedrockProvider {
    provider_with(server, model, AwsCredentials::new("AKIDEXAMPLE", "secret"))
}

fn provider_with(server: &MockServer, model: &str, creds: AwsCredentials) -> BedrockProvider {
    BedrockProvider::new(
        BedrockConfig::new(model, "us-east-1").with_endpoint(server.uri()),
        creds,
    )
    .unwrap()
}

fn existing() -> Vec<String> {
    vec!["Twain, Mark".to_string()]
}

#[tokio::test]
async fn anthropic_request_is_signed_and_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CLAUDE_PATH))
        .and(header("content-type", "application/json"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(header_exists("x-amz-content-sha256"))
        .and(body_partial_json(json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": 2000,
            "system": SYSTEM_PROMPT,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::anthropic_reply(
            "```json\n{\"didYouMean\": \"\", \"suggestions\": [\"Twain, Mark\", \"Clemens, Samuel\"]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let proposal = provider(&server, CLAUDE)
        .get_suggestions("twain", "", &existing())
        .await
        .unwrap();

    assert_eq!(proposal.did_you_mean, None);
    assert_eq!(proposal.suggestions, vec!["Twain, Mark", "Clemens, Samuel"]);
}

#[tokio::test]
async fn authorization_scope_names_bedrock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMMA_PATH))
        .and(|req: &Request| {
            req.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(|v| {
                    v.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/")
                        && v.contains("/us-east-1/bedrock/aws4_request")
                })
                .unwrap_or(false)
        })
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::gemma_reply("{\"suggestions\": []}")),
        )
        .expect(1)
        .mount(&server)
        .await;

    provider(&server, GEMMA)
        .get_suggestions("twain", "", &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn gemma_folds_system_prompt_into_user_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMMA_PATH))
        .and(body_partial_json(json!({ "maxTokens": 2000, "temperature": 0.5, "topP": 0.9 })))
        .and(|req: &Request| {
            let body: Value = match serde_json::from_slice(&req.body) {
                Ok(v) => v,
                Err(_) => return false,
            };
            body.get("system").is_none()
                && body["messages"][0]["role"] == "user"
                && body["messages"][0]["content"] == format!("{}\n\ncustom prompt", SYSTEM_PROMPT)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::gemma_reply(
            "Sure! {\"didYouMean\": \"mark twain\", \"suggestions\": [\"Twain, Mark\"]}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let proposal = provider(&server, GEMMA)
        .get_suggestions("twian", "custom prompt", &[])
        .await
        .unwrap();

    assert_eq!(proposal.did_you_mean.as_deref(), Some("mark twain"));
    assert_eq!(proposal.suggestions, vec!["Twain, Mark"]);
}

#[tokio::test]
async fn converse_shaped_gemma_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMMA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": { "message": { "content": [{ "text": "{\"suggestions\": [\"Clemens, Samuel\"]}" }] } }
        })))
        .mount(&server)
        .await;

    let proposal = provider(&server, GEMMA)
        .get_suggestions("twain", "", &[])
        .await
        .unwrap();
    assert_eq!(proposal.suggestions, vec!["Clemens, Samuel"]);
}

#[tokio::test]
async fn error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CLAUDE_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "The security token included in the request is invalid." })),
        )
        .mount(&server)
        .await;

    let err = provider(&server, CLAUDE)
        .get_suggestions("twain", "", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Api { status: 403, .. }));
    assert!(err.to_string().contains("security token"));
}

#[tokio::test]
async fn empty_and_non_json_text_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CLAUDE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
        .mount(&server)
        .await;

    let err = provider(&server, CLAUDE)
        .get_suggestions("twain", "", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::EmptyContent));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CLAUDE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::anthropic_reply("I could not think of any authors.")),
        )
        .mount(&server)
        .await;

    let err = provider(&server, CLAUDE)
        .get_suggestions("twain", "", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NoJsonObject));
}

#[tokio::test]
async fn session_token_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CLAUDE_PATH))
        .and(header("x-amz-security-token", "session-tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::anthropic_reply("{\"suggestions\": [\"Twain, Mark\"]}")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let creds = AwsCredentials::new("AKIDEXAMPLE", "secret").with_session_token("session-tok");
    let proposal = provider_with(&server, CLAUDE, creds)
        .get_suggestions("twain", "", &[])
        .await
        .unwrap();
    assert_eq!(proposal.suggestions, vec!["Twain, Mark"]);
}
