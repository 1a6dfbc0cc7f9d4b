//! Search service client for the provider-state harness.
//!
//! This crate provides:
//!
//! - Bearer token minting ([`JwtTokenProvider`]) for the shared-secret JWT the
//!   search service expects
//! - The [`SearchGateway`] seam with its reqwest implementation,
//!   [`SearchServiceClient`]
//! - [`GatewayResponse`], which keeps status, raw body and parsed JSON together
//!
//! # Example
//!
//! ```ignore
//! use pact_state_api::{JwtTokenProvider, SearchGateway, SearchServiceClient};
//! use pact_state_types::SearchRequest;
//!
//! let client = SearchServiceClient::new("http://localhost:8000", &JwtTokenProvider::default())?;
//! let response = client.search_persons(&SearchRequest::for_term("Peter")).await?;
//! println!("status: {}", response.status);
//! ```

mod gateway;
mod token;

pub use gateway::{GatewayError, GatewayResponse, SearchGateway};
pub use reqwest::StatusCode;
pub use token::{
    DEFAULT_TOKEN_SECRET, DEFAULT_TOKEN_SUBJECT, JwtTokenProvider, SessionClaims, StaticTokenProvider, TokenError, TokenProvider,
    verifier_header_argument,
};

use std::time::Duration;

use async_trait::async_trait;
use pact_state_types::{IndexRequest, SearchRequest};
use pact_state_util::redact_sensitive;
use reqwest::{Client, Url, header};
use serde::Serialize;
use tracing::debug;

/// Path accepting index writes.
pub const PERSONS_INDEX_PATH: &str = "/persons";
/// Path accepting search queries.
pub const PERSONS_SEARCH_PATH: &str = "/persons/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`SearchGateway`].
///
/// The bearer token is minted once, when the client is built, and sent on
/// every request for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct SearchServiceClient {
    base_url: String,
    http: Client,
}

impl SearchServiceClient {
    /// Build a client for `base_url`, minting a token from `tokens`.
    pub fn new(base_url: &str, tokens: &dyn TokenProvider) -> Result<Self, GatewayError> {
        let parsed = validate_base_url(base_url)?;
        let token = tokens.bearer_token()?;

        let mut default_headers = header::HeaderMap::new();
        let mut authorization = header::HeaderValue::from_str(&format!("Bearer {token}"))?;
        authorization.set_sensitive(true);
        default_headers.insert(header::AUTHORIZATION, authorization);
        default_headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an API path onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(path);
        let payload = serde_json::to_string(body)?;
        debug!(%url, body = %redact_sensitive(&payload), "search service request");

        let response = self
            .http
            .post(&url)
            .body(payload)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { url: url.clone(), source })?;
        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport { url: url.clone(), source })?;
        debug!(%url, status = status.as_u16(), body_len = raw.len(), "search service response");

        Ok(GatewayResponse::new(status, raw))
    }
}

#[async_trait]
impl SearchGateway for SearchServiceClient {
    async fn index_persons(&self, request: &IndexRequest) -> Result<GatewayResponse, GatewayError> {
        self.post(PERSONS_INDEX_PATH, request).await
    }

    async fn search_persons(&self, request: &SearchRequest) -> Result<GatewayResponse, GatewayError> {
        self.post(PERSONS_SEARCH_PATH, request).await
    }
}

/// Validate that a base URL is usable for the search service.
///
/// The URL must be absolute, use `http`, and name a host. The client is built
/// without TLS, so `https` is refused here rather than at the first request.
pub fn validate_base_url(base: &str) -> Result<Url, GatewayError> {
    let invalid = |reason: String| GatewayError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base.trim()).map_err(|error| invalid(error.to_string()))?;

    match parsed.scheme() {
        "http" => {}
        "https" => return Err(invalid("https is not supported; use an http:// URL".to_string())),
        other => return Err(invalid(format!("unsupported scheme '{other}://'"))),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must include a host".to_string()));
    }

    Ok(parsed)
}
