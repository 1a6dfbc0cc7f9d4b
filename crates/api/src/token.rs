//! Bearer credential minting.
//!
//! The search service authenticates every request with an HS256 JWT whose
//! payload names the acting user in `session-data`. In the contract-test
//! environment both sides share a fixed secret, so the harness can mint its
//! own token at start-up.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subject the contract-test environment expects in `session-data`.
pub const DEFAULT_TOKEN_SUBJECT: &str = "system.admin@opgtest.com";
/// Secret shared with the search service's local test stack.
pub const DEFAULT_TOKEN_SECRET: &str = "MyTestSecret";

/// Source of the bearer token attached to outbound requests.
pub trait TokenProvider: Send + Sync {
    /// Produce a token string, without the `Bearer ` prefix.
    fn bearer_token(&self) -> Result<String, TokenError>;
}

/// Errors raised while producing a bearer token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "session-data")]
    pub session_data: String,
    pub iat: i64,
}

/// Mints HS256 session tokens from a shared secret.
#[derive(Clone)]
pub struct JwtTokenProvider {
    subject: String,
    secret: String,
}

impl JwtTokenProvider {
    pub fn new(subject: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            secret: secret.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl Default for JwtTokenProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_SUBJECT, DEFAULT_TOKEN_SECRET)
    }
}

impl std::fmt::Debug for JwtTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenProvider")
            .field("subject", &self.subject)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl TokenProvider for JwtTokenProvider {
    fn bearer_token(&self) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let claims = SessionClaims {
            session_data: self.subject.clone(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }
}

/// Hands out a pre-minted token.
#[derive(Clone)]
pub struct StaticTokenProvider(String);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, TokenError> {
        Ok(self.0.clone())
    }
}

/// Render a token as a `name=value` header argument for the pact verifier CLI.
pub fn verifier_header_argument(token: &str) -> String {
    format!("Authorization=Bearer {token}")
}
