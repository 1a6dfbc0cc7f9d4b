//! Logical operations against the search service.

use async_trait::async_trait;
use pact_state_types::{IndexRequest, SearchRequest, SearchResult};
use pact_state_util::http::parse_response_body;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::token::TokenError;

/// Response from a single gateway call.
///
/// Non-2xx responses are returned as data; callers inspect `status` explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    /// JSON view of `raw`, when it parses.
    pub body: Option<Value>,
    pub raw: String,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let body = parse_response_body(&raw, status.as_u16()).unwrap_or_else(|error| {
            warn!(status = error.status(), preview = error.preview(), %error, "search service body is not JSON");
            None
        });
        Self { status, body, raw }
    }

    /// Build a response from a JSON value, as the search service would send it.
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            raw: body.to_string(),
            body: Some(body),
        }
    }

    /// The write was accepted for asynchronous indexing (202).
    pub fn is_accepted(&self) -> bool {
        self.status == StatusCode::ACCEPTED
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Typed view of a search response body.
    pub fn search_result(&self) -> Option<SearchResult> {
        self.body
            .as_ref()
            .and_then(|body| serde_json::from_value::<SearchResult>(body.clone()).ok())
    }

    /// Whether the body is a search result with at least one hit.
    pub fn has_results(&self) -> bool {
        self.search_result().is_some_and(|result| !result.is_empty())
    }

    /// Status 200 with at least one result.
    pub fn confirms_visibility(&self) -> bool {
        self.is_ok() && self.has_results()
    }
}

/// Errors that prevent a gateway call from producing a response.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid search service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("could not mint bearer token: {0}")]
    Token(#[from] TokenError),

    #[error("invalid request header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("could not build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The two operations the harness performs against the search service.
///
/// Each call performs exactly one request; retrying is the caller's concern.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Submit records for indexing (`POST /persons`).
    async fn index_persons(&self, request: &IndexRequest) -> Result<GatewayResponse, GatewayError>;

    /// Run a single search query (`POST /persons/search`).
    async fn search_persons(&self, request: &SearchRequest) -> Result<GatewayResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_json_bodies_keep_raw_text_only() {
        let response = GatewayResponse::new(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(response.body.is_none());
        assert_eq!(response.raw, "<html>bad gateway</html>");
        assert!(!response.has_results());
    }

    #[test]
    fn visibility_requires_ok_status_and_results() {
        let hit = json!({"results": [{"firstname": "Peter"}], "total": {"count": 1, "exact": true}});
        assert!(GatewayResponse::json(StatusCode::OK, hit.clone()).confirms_visibility());
        assert!(!GatewayResponse::json(StatusCode::INTERNAL_SERVER_ERROR, hit).confirms_visibility());
        assert!(!GatewayResponse::json(StatusCode::OK, json!({"results": []})).confirms_visibility());
        assert!(!GatewayResponse::json(StatusCode::OK, json!({"error": "nope"})).confirms_visibility());
    }

    #[test]
    fn ok_status_with_html_body_is_not_visibility() {
        let response = GatewayResponse::new(StatusCode::OK, "<html>maintenance</html>");
        assert!(response.body.is_none());
        assert!(response.search_result().is_none());
        assert!(!response.confirms_visibility());
    }

    #[test]
    fn malformed_results_field_is_not_visibility() {
        let response = GatewayResponse::json(StatusCode::OK, json!({"results": "Peter"}));
        assert!(response.search_result().is_none());
        assert!(!response.confirms_visibility());
    }

    #[test]
    fn search_result_parses_count() {
        let response = GatewayResponse::new(StatusCode::OK, r#"{"results":[{"uId":"7000-8813-9100"}],"total":{"count":1}}"#);
        let result = response.search_result().expect("search result");
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.total.map(|total| total.count), Some(1));
    }

    #[test]
    fn accepted_means_202_only() {
        assert!(GatewayResponse::new(StatusCode::ACCEPTED, "").is_accepted());
        assert!(!GatewayResponse::new(StatusCode::OK, "").is_accepted());
    }
}
