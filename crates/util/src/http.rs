//! # HTTP response helpers
//!
//! Parsing utilities for search service response bodies. Bodies are always
//! kept as raw text by the caller; these helpers add the optional JSON view.

use serde_json::Value;
use thiserror::Error;

/// Longest body excerpt carried by [`ResponseBodyError`].
pub const BODY_PREVIEW_LIMIT: usize = 200;

/// Parse a response body as JSON.
///
/// Blank bodies (a bare `202 Accepted`, for instance) carry no document and
/// yield `Ok(None)`. Any other text must be valid JSON.
///
/// # Example
/// ```rust
/// use pact_state_util::http::parse_response_body;
///
/// assert!(parse_response_body(r#"{"results": []}"#, 200).unwrap().is_some());
/// assert!(parse_response_body("", 202).unwrap().is_none());
/// assert!(parse_response_body("<html>", 502).is_err());
/// ```
pub fn parse_response_body(text: &str, status: u16) -> Result<Option<Value>, ResponseBodyError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Value>(text)
        .map(Some)
        .map_err(|source| ResponseBodyError {
            status,
            source,
            preview: body_preview(text, BODY_PREVIEW_LIMIT),
        })
}

/// Single-line excerpt of `text`, cut after `limit` bytes.
fn body_preview(text: &str, limit: usize) -> String {
    let mut preview = String::with_capacity(limit.min(text.len()) + 3);
    for ch in text.split_whitespace().flat_map(|word| word.chars().chain(std::iter::once(' '))) {
        if preview.len() >= limit {
            preview.push_str("...");
            return preview;
        }
        preview.push(ch);
    }
    preview.trim_end().to_string()
}

/// A non-empty response body that is not JSON.
#[derive(Debug, Error)]
#[error("status {status} response is not JSON: {source} (body: {preview})")]
pub struct ResponseBodyError {
    status: u16,
    #[source]
    source: serde_json::Error,
    preview: String,
}

impl ResponseBodyError {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whitespace-collapsed excerpt of the offending body.
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_bodies_have_no_document() {
        assert!(parse_response_body("", 202).unwrap().is_none());
        assert!(parse_response_body(" \n", 200).unwrap().is_none());
    }

    #[test]
    fn invalid_bodies_report_status_and_preview() {
        let error = parse_response_body("upstream\n  exploded", 502).unwrap_err();
        assert_eq!(error.status(), 502);
        assert_eq!(error.preview(), "upstream exploded");
        assert!(error.to_string().contains("status 502"));
    }

    #[test]
    fn long_previews_are_cut() {
        let long = "x".repeat(500);
        let error = parse_response_body(&long, 200).unwrap_err();
        assert!(error.preview().ends_with("..."));
        assert_eq!(error.preview().len(), BODY_PREVIEW_LIMIT + 3);
    }
}
