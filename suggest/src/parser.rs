//! Turns free-form model output into a bounded suggestion list.

use errors::SuggestionError;
use task_core::{RawResponse, SuggestionResult};

/// Text of the first part of the first candidate.
///
/// A response without a candidate, content or text part is malformed.
pub fn extract_text(response: &RawResponse) -> Result<&str, SuggestionError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| SuggestionError::invalid_response("response has no candidates"))?;

    let content = candidate
        .content
        .as_ref()
        .ok_or_else(|| SuggestionError::invalid_response("candidate has no content"))?;

    content
        .parts
        .first()
        .and_then(|part| part.text.as_deref())
        .ok_or_else(|| SuggestionError::invalid_response("content has no text part"))
}

/// Splits numbered-list text into suggestions.
///
/// Blank lines are dropped, a leading `N.` or `N)` marker is removed, as is
/// `N:` or `N -` when followed by whitespace. Only the first five survivors
/// are kept. Lines without a marker are kept as they are, so `5-minute sync`
/// and `10:30 kickoff` survive intact.
pub fn parse_suggestions(text: &str) -> SuggestionResult {
    let suggestions = text
        .lines()
        .map(strip_marker)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    SuggestionResult::new(suggestions)
}

fn strip_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 {
        return trimmed;
    }

    let rest = trimmed[digits_end..].trim_start();
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some('.' | ')'), _) => &rest[1..],
        (Some(':' | '-'), None) => "",
        (Some(':' | '-'), Some(next)) if next.is_whitespace() => &rest[1..],
        _ => trimmed
    }
}
