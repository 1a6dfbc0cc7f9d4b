//! In-memory gateway and pause doubles for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pact_state_api::{GatewayError, GatewayResponse, SearchGateway, StatusCode, TokenError};
use pact_state_types::{IndexRequest, SearchRequest};
use serde_json::json;

use crate::confirm::Pause;
use crate::fixtures::{Fixture, FixtureTable};

pub(crate) const PETER_STATE: &str = "Person called Peter with person type type1 has been indexed";

pub(crate) fn peter_fixture() -> Fixture {
    FixtureTable::embedded()
        .expect("embedded fixtures")
        .get(PETER_STATE)
        .cloned()
        .expect("peter fixture")
}

pub(crate) fn accepted() -> GatewayResponse {
    GatewayResponse::new(StatusCode::ACCEPTED, "")
}

pub(crate) fn empty_results() -> GatewayResponse {
    GatewayResponse::json(StatusCode::OK, json!({"results": [], "total": {"count": 0, "exact": true}}))
}

pub(crate) fn one_result() -> GatewayResponse {
    GatewayResponse::json(
        StatusCode::OK,
        json!({"results": [{"firstname": "Peter", "personType": "type1"}], "total": {"count": 1, "exact": true}}),
    )
}

/// Gateway answering from a fixed script and recording every call.
///
/// Once the search script runs out it keeps answering with empty results.
pub(crate) struct ScriptedGateway {
    index_response: Option<GatewayResponse>,
    search_responses: Mutex<VecDeque<GatewayResponse>>,
    fail_search_after: Option<usize>,
    index_calls: Mutex<Vec<IndexRequest>>,
    search_calls: Mutex<Vec<SearchRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new(index_response: GatewayResponse, search_responses: Vec<GatewayResponse>) -> Self {
        Self {
            index_response: Some(index_response),
            search_responses: Mutex::new(search_responses.into()),
            fail_search_after: None,
            index_calls: Mutex::new(Vec::new()),
            search_calls: Mutex::new(Vec::new()),
        }
    }

    /// A gateway whose index call fails before producing a response.
    pub(crate) fn unreachable() -> Self {
        Self {
            index_response: None,
            ..Self::new(accepted(), Vec::new())
        }
    }

    pub(crate) fn failing_search_after(mut self, successful_calls: usize) -> Self {
        self.fail_search_after = Some(successful_calls);
        self
    }

    pub(crate) fn index_calls(&self) -> Vec<IndexRequest> {
        self.index_calls.lock().expect("index calls").clone()
    }

    pub(crate) fn search_calls(&self) -> Vec<SearchRequest> {
        self.search_calls.lock().expect("search calls").clone()
    }
}

fn scripted_failure() -> GatewayError {
    GatewayError::Token(TokenError::EmptySecret)
}

#[async_trait]
impl SearchGateway for ScriptedGateway {
    async fn index_persons(&self, request: &IndexRequest) -> Result<GatewayResponse, GatewayError> {
        self.index_calls.lock().expect("index calls").push(request.clone());
        self.index_response.clone().ok_or_else(scripted_failure)
    }

    async fn search_persons(&self, request: &SearchRequest) -> Result<GatewayResponse, GatewayError> {
        let call_count = {
            let mut calls = self.search_calls.lock().expect("search calls");
            calls.push(request.clone());
            calls.len()
        };
        if self.fail_search_after.is_some_and(|limit| call_count > limit) {
            return Err(scripted_failure());
        }
        let next = self.search_responses.lock().expect("search responses").pop_front();
        Ok(next.unwrap_or_else(empty_results))
    }
}

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub(crate) struct RecordingPause {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingPause {
    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.lock().expect("waits").clone()
    }
}

#[async_trait]
impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) {
        self.waits.lock().expect("waits").push(duration);
    }
}
