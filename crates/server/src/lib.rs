//! HTTP surface for pact provider-state change notifications.
//!
//! The pact verifier posts `{"action", "params", "state"}` to
//! `/provider_state_change` before (and after) each interaction. In
//! [`StateChangeMode::Seed`] the request is handed to the engine's
//! [`Dispatcher`]; in [`StateChangeMode::Echo`] the raw body is returned
//! untouched, which is enough to bring up a verifier run without a search
//! service.

mod host;

pub use host::{DEFAULT_BIND_ADDRESS, RunningStateChangeServer, StateChangeServer, resolve_bind_address};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use pact_state_engine::Dispatcher;
use pact_state_types::StateChangeRequest;
use tracing::{info, warn};

/// Route receiving state-change notifications.
pub const STATE_CHANGE_PATH: &str = "/provider_state_change";
/// Liveness probe route.
pub const HEALTH_PATH: &str = "/healthz";

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// How the state-change route treats incoming notifications.
#[derive(Clone)]
pub enum StateChangeMode {
    /// Resolve fixtures and seed the search service.
    Seed(Dispatcher),
    /// Return the request body verbatim without touching any fixture.
    Echo,
}

impl StateChangeMode {
    pub fn name(&self) -> &'static str {
        match self {
            StateChangeMode::Seed(_) => "seed",
            StateChangeMode::Echo => "echo",
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    mode: StateChangeMode,
}

impl AppState {
    pub fn new(mode: StateChangeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &StateChangeMode {
        &self.mode
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(STATE_CHANGE_PATH, post(provider_state_change))
        .route(HEALTH_PATH, get(healthz))
        .with_state(state)
}

async fn healthz() -> Response {
    plain_text(StatusCode::OK, "ok")
}

async fn provider_state_change(State(state): State<AppState>, body: Bytes) -> Response {
    match state.mode() {
        StateChangeMode::Echo => {
            info!(body = %String::from_utf8_lossy(&body), "state change received; echoing");
            plain_text(StatusCode::OK, body)
        }
        StateChangeMode::Seed(dispatcher) => {
            let request = parse_state_change(&body);
            let outcome = dispatcher.handle(&request).await;
            let status = StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            plain_text(status, outcome.message())
        }
    }
}

/// Decode a notification body. Bodies that do not decode carry no state.
fn parse_state_change(body: &[u8]) -> StateChangeRequest {
    match serde_json::from_slice::<StateChangeRequest>(body) {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, body_len = body.len(), "state change body is not a valid notification");
            StateChangeRequest::default()
        }
    }
}

fn plain_text(status: StatusCode, body: impl Into<axum::body::Body>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], body.into()).into_response()
}
