//! AI Refinement
//!
//! Asks the configured provider to correct, extend or replace the catalog's
//! baseline author suggestions. Proposals are unverified; the caller checks
//! them against the backend before they reach a user.

use std::sync::Arc;
use std::time::Instant;

use super::prompt::build_prompt;
use super::provider::{AIProposal, AIProvider, Result};

pub struct AIRefiner {
    provider: Arc<dyn AIProvider>,
    template: Option<String>,
}

impl AIRefiner {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            template: None,
        }
    }

    /// Use an operator prompt template (`$QUERY`, `$RESULTS`) instead of the
    /// built-in prompt. Blank templates are ignored.
    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template.filter(|t| !t.trim().is_empty());
        self
    }

    /// Request a proposal for `raw_query`.
    ///
    /// `term` is the parsed keyword when the query was eligible; it only
    /// affects logging. The raw query always goes to the model so it can
    /// spot misspellings in ineligible input too. `prompt_override` beats the
    /// configured template.
    pub async fn refine(
        &self,
        term: Option<&str>,
        raw_query: &str,
        baseline: &[String],
        prompt_override: Option<&str>,
    ) -> Result<AIProposal> {
        let template = prompt_override
            .filter(|t| !t.trim().is_empty())
            .or(self.template.as_deref());
        let prompt = build_prompt(raw_query, baseline, template);

        log::debug!(
            "[AI] {}/{} refining term={:?} with {} baseline suggestion(s)",
            self.provider.name(),
            self.provider.model(),
            term,
            baseline.len()
        );

        let start = Instant::now();
        let result = self
            .provider
            .get_suggestions(raw_query, &prompt, baseline)
            .await;
        let elapsed = start.elapsed().as_millis();

        match &result {
            Ok(proposal) => log::info!(
                "[AI] {} proposed {} term(s) in {} ms",
                self.provider.name(),
                proposal.suggestions.len(),
                elapsed
            ),
            Err(e) => log::warn!(
                "[AI] {} failed after {} ms: {}",
                self.provider.name(),
                elapsed,
                e
            ),
        }

        result.map(AIProposal::normalized)
    }
}
