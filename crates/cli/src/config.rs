//! Process configuration resolved from the environment and CLI flags.

use std::path::PathBuf;

use pact_state_api::{DEFAULT_TOKEN_SECRET, DEFAULT_TOKEN_SUBJECT, JwtTokenProvider};
use pact_state_util::{expand_tilde, non_empty_env};

pub const SEARCH_SERVICE_URL_ENV: &str = "SEARCH_SERVICE_URL";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_SUBJECT_ENV: &str = "JWT_SUBJECT";
pub const FIXTURES_PATH_ENV: &str = "PROVIDER_STATE_FIXTURES";
pub const BIND_ADDRESS_ENV: &str = "PROVIDER_STATE_BIND";

const DEFAULT_SEARCH_SERVICE_URL: &str = "http://localhost:8000";

/// Settings needed to run the harness.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub search_service_url: String,
    pub token_subject: String,
    pub token_secret: String,
    /// Fixture file replacing the bundled fixtures.
    pub fixtures_path: Option<PathBuf>,
    pub bind_address: Option<String>,
}

impl Config {
    /// Read settings from the environment, falling back to the local test stack defaults.
    pub fn from_env() -> Self {
        Self {
            search_service_url: non_empty_env(SEARCH_SERVICE_URL_ENV).unwrap_or_else(|| DEFAULT_SEARCH_SERVICE_URL.to_string()),
            token_subject: non_empty_env(JWT_SUBJECT_ENV).unwrap_or_else(|| DEFAULT_TOKEN_SUBJECT.to_string()),
            token_secret: non_empty_env(JWT_SECRET_ENV).unwrap_or_else(|| DEFAULT_TOKEN_SECRET.to_string()),
            fixtures_path: non_empty_env(FIXTURES_PATH_ENV).map(|path| expand_tilde(&path)),
            bind_address: non_empty_env(BIND_ADDRESS_ENV),
        }
    }

    pub fn token_provider(&self) -> JwtTokenProvider {
        JwtTokenProvider::new(&self.token_subject, &self.token_secret)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("search_service_url", &self.search_service_url)
            .field("token_subject", &self.token_subject)
            .field("token_secret", &"<redacted>")
            .field("fixtures_path", &self.fixtures_path)
            .field("bind_address", &self.bind_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 5] = [
        SEARCH_SERVICE_URL_ENV,
        JWT_SECRET_ENV,
        JWT_SUBJECT_ENV,
        FIXTURES_PATH_ENV,
        BIND_ADDRESS_ENV,
    ];

    #[test]
    fn defaults_match_local_test_stack() {
        temp_env::with_vars_unset(ALL_VARS, || {
            let config = Config::from_env();
            assert_eq!(config.search_service_url, "http://localhost:8000");
            assert_eq!(config.token_subject, "system.admin@opgtest.com");
            assert_eq!(config.token_secret, "MyTestSecret");
            assert_eq!(config.fixtures_path, None);
            assert_eq!(config.bind_address, None);
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        temp_env::with_vars(
            [
                (SEARCH_SERVICE_URL_ENV, Some("http://search-service:8000")),
                (JWT_SECRET_ENV, Some("another-secret")),
                (JWT_SUBJECT_ENV, Some("tester@example.com")),
                (FIXTURES_PATH_ENV, Some("/etc/pact/fixtures.json")),
                (BIND_ADDRESS_ENV, Some("127.0.0.1:6000")),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.search_service_url, "http://search-service:8000");
                assert_eq!(config.token_secret, "another-secret");
                assert_eq!(config.token_provider().subject(), "tester@example.com");
                assert_eq!(config.fixtures_path, Some(PathBuf::from("/etc/pact/fixtures.json")));
                assert_eq!(config.bind_address.as_deref(), Some("127.0.0.1:6000"));
            },
        );
    }

    #[test]
    fn debug_output_hides_secret() {
        temp_env::with_var(JWT_SECRET_ENV, Some("do-not-print"), || {
            let rendered = format!("{:?}", Config::from_env());
            assert!(!rendered.contains("do-not-print"));
        });
    }
}
