//! State-change classification.
//!
//! The dispatcher is stateless between calls: every notification is resolved
//! against the read-only fixture table and, when a fixture exists, driven
//! through [`confirm_indexed`]. Failures to reach the search service are
//! reported as an outcome instead of escaping the handler.

use std::sync::Arc;

use pact_state_api::SearchGateway;
use pact_state_types::{Outcome, StateChangeRequest};
use tracing::{info, warn};

use crate::confirm::{Confirmation, Pause, RetryPolicy, TokioPause, confirm_indexed};
use crate::fixtures::FixtureTable;

/// Everything a state-change request needs, built once at start-up.
#[derive(Clone)]
pub struct Dispatcher {
    fixtures: Arc<FixtureTable>,
    gateway: Arc<dyn SearchGateway>,
    policy: RetryPolicy,
    pause: Arc<dyn Pause>,
}

impl Dispatcher {
    /// Create a dispatcher with the default retry policy and a tokio timer.
    pub fn new(fixtures: FixtureTable, gateway: Arc<dyn SearchGateway>) -> Self {
        Self {
            fixtures: Arc::new(fixtures),
            gateway,
            policy: RetryPolicy::default(),
            pause: Arc::new(TokioPause),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the wait used between search attempts.
    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    pub fn fixtures(&self) -> &FixtureTable {
        &self.fixtures
    }

    /// Classify a state-change notification, seeding the search service when
    /// the state names a known fixture.
    pub async fn handle(&self, request: &StateChangeRequest) -> Outcome {
        let action = request.action.map(|action| action.to_string()).unwrap_or_else(|| "none".into());

        let Some(state) = request.state_name() else {
            warn!(%action, "state change without a state");
            return Outcome::NoStateProvided;
        };
        let state = state.to_string();

        let Some(fixture) = self.fixtures.get(&state) else {
            info!(%action, %state, "no fixture for state; ignoring");
            return Outcome::UnrecognisedState { state };
        };

        info!(%action, %state, term = %fixture.search_term, "seeding fixture");
        let outcome = match confirm_indexed(self.gateway.as_ref(), fixture, self.policy, self.pause.as_ref()).await {
            Ok(Confirmation::Visible(searched)) => Outcome::Confirmed {
                state,
                attempts: searched.attempts,
            },
            Ok(Confirmation::IndexRejected { response }) => Outcome::IndexingFailed {
                state,
                status: response.status.as_u16(),
            },
            Ok(Confirmation::NotVisible(searched)) => Outcome::ConfirmationFailed {
                state,
                status: searched.response.status.as_u16(),
                attempts: searched.attempts,
            },
            Err(error) => Outcome::TransportFailed {
                state,
                reason: error.to_string(),
            },
        };

        if outcome.is_success() {
            info!(status = outcome.status_code(), "{outcome}");
        } else {
            warn!(status = outcome.status_code(), "{outcome}");
        }
        outcome
    }
}
