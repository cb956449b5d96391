//! Model Payload Dialects
//!
//! Bedrock-hosted models do not share a request/response shape. The dialect
//! is picked from the model identifier alone so it can be tested without a
//! network call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::{ProviderError, Result};

/// Token ceiling for generated replies.
pub const MAX_TOKENS: u32 = 2000;

/// Version string the Anthropic messages API on Bedrock requires.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Request/response shape spoken by a model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDialect {
    /// Separate `system` field plus a `messages` list (Anthropic Claude).
    SystemMessages,
    /// Single-turn chat; the system text is folded into the user turn (Gemma).
    ChatTurns,
}

impl ModelDialect {
    /// Classify a model identifier. Anything not recognised as a chat-turn
    /// model uses the system+messages shape.
    pub fn classify(model: &str) -> Self {
        if model.to_lowercase().contains("gemma") {
            ModelDialect::ChatTurns
        } else {
            ModelDialect::SystemMessages
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelDialect::SystemMessages => "system-messages",
            ModelDialect::ChatTurns => "chat-turns",
        }
    }

    /// Serialize the request body for this dialect.
    pub fn request_body(&self, system: &str, prompt: &str) -> Result<Vec<u8>> {
        let body = match self {
            ModelDialect::SystemMessages => serde_json::to_vec(&SystemMessagesRequest {
                anthropic_version: ANTHROPIC_VERSION,
                max_tokens: MAX_TOKENS,
                system,
                messages: vec![TurnMessage {
                    role: "user",
                    content: prompt.to_string(),
                }],
            }),
            ModelDialect::ChatTurns => serde_json::to_vec(&ChatTurnsRequest {
                messages: vec![TurnMessage {
                    role: "user",
                    content: format!("{}\n\n{}", system, prompt),
                }],
                max_tokens: MAX_TOKENS,
                temperature: 0.5,
                top_p: 0.9,
            }),
        };

        body.map_err(|e| ProviderError::InvalidResponse(format!("failed to marshal request: {e}")))
    }

    /// Pull the generated text out of a decoded response body.
    ///
    /// Returns `Ok("")` when the shape is right but carries no text; the
    /// caller treats that as empty content.
    pub fn extract_text(&self, body: &[u8]) -> Result<String> {
        match self {
            ModelDialect::SystemMessages => {
                let resp: SystemMessagesResponse = serde_json::from_slice(body).map_err(|e| {
                    ProviderError::InvalidResponse(format!("failed to decode anthropic response: {e}"))
                })?;
                Ok(resp.content.into_iter().next().map(|c| c.text).unwrap_or_default())
            }
            ModelDialect::ChatTurns => {
                let value: Value = serde_json::from_slice(body).map_err(|e| {
                    ProviderError::InvalidResponse(format!("failed to decode gemma response: {e}"))
                })?;
                Ok(chat_turns_text(&value).unwrap_or_default())
            }
        }
    }
}

/// Chat-turn replies come in either the OpenAI `choices` shape or the
/// Converse `output.message.content[]` shape.
fn chat_turns_text(value: &Value) -> Option<String> {
    let from_choices = value["choices"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["message"]["content"].as_str())
        .filter(|s| !s.is_empty());

    let from_output = || {
        value["output"]["message"]["content"]
            .as_array()
            .and_then(|blocks| blocks.first())
            .and_then(|b| b["text"].as_str())
    };

    from_choices.or_else(from_output).map(str::to_string)
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TurnMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct SystemMessagesRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<TurnMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatTurnsRequest {
    messages: Vec<TurnMessage>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct SystemMessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}
