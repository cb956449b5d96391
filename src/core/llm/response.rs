//! Generated Text Parsing
//!
//! Models like to wrap their JSON in markdown fences or chatty prose. We
//! strip fences, then decode the span between the first `{` and the last `}`.

use super::provider::{AIProposal, ProviderError, Result};

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // drop the info string (e.g. "json") on the opening fence line
    let body = match rest.find('\n') {
        Some(nl) if !rest[..nl].contains('{') => &rest[nl + 1..],
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end().trim_end_matches("```").trim()
}

/// Slice from the first `{` to the last `}` inclusive.
pub fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a provider's generated text into a proposal.
pub fn parse_proposal(text: &str) -> Result<AIProposal> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(ProviderError::EmptyContent);
    }

    let span = json_object_span(cleaned).ok_or(ProviderError::NoJsonObject)?;
    let proposal: AIProposal = serde_json::from_str(span)?;

    Ok(proposal.normalized())
}
