//! Hand-written fakes
//!
//! `mockall` covers expectation-style tests inside modules. These fakes are
//! for integration tests that want a scripted reply and a call log.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::core::llm::{AIProposal, AIProvider, ProviderError, Result};

/// What a [`ScriptedProvider`] answers.
#[derive(Debug, Clone)]
pub enum Script {
    Propose(AIProposal),
    EmptyContent,
    Status(u16),
}

/// A provider that replays one scripted answer and records every call.
pub struct ScriptedProvider {
    script: Script,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub query: String,
    pub prompt: String,
    pub existing: Vec<String>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn proposing(terms: &[&str]) -> Arc<Self> {
        Self::new(Script::Propose(AIProposal::new(
            terms.iter().map(|t| t.to_string()).collect(),
        )))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AIProvider for ScriptedProvider {
    async fn get_suggestions(
        &self,
        query: &str,
        custom_prompt: &str,
        existing_suggestions: &[String],
    ) -> Result<AIProposal> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                query: query.to_string(),
                prompt: custom_prompt.to_string(),
                existing: existing_suggestions.to_vec(),
            });
        }

        match &self.script {
            Script::Propose(proposal) => Ok(proposal.clone()),
            Script::EmptyContent => Err(ProviderError::EmptyContent),
            Script::Status(status) => Err(ProviderError::Api {
                status: *status,
                message: "scripted failure".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}
