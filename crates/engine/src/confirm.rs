//! Read-after-write confirmation.
//!
//! Indexing in the search service is asynchronous, so a record accepted by
//! `POST /persons` may not be searchable straight away. This module submits a
//! fixture once and then polls search with a flat interval until the record
//! shows up or the retry budget runs out. The write itself is never retried.

use std::time::Duration;

use async_trait::async_trait;
use pact_state_api::{GatewayError, GatewayResponse, SearchGateway};
use pact_state_types::{IndexRequest, SearchRequest};
use tracing::{debug, info, warn};

use crate::fixtures::Fixture;

/// Retries after the first search when none is configured.
pub const DEFAULT_SEARCH_RETRIES: u32 = 3;
/// Wait between search attempts when none is configured.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Bounded, fixed-interval retry budget for the visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Searches allowed after the first one.
    pub retries: u32,
    /// Wait before each retry. Not scaled between attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }

    /// Upper bound on search calls, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_RETRIES, DEFAULT_RETRY_INTERVAL)
    }
}

/// Waits between search attempts.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer. Only the task handling the request waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Last search response and the number of searches that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchAttempts {
    pub response: GatewayResponse,
    pub attempts: u32,
}

impl SearchAttempts {
    pub fn is_visible(&self) -> bool {
        self.response.confirms_visibility()
    }
}

/// Result of indexing a fixture and checking it became searchable.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// The index write was answered with something other than 202.
    IndexRejected { response: GatewayResponse },
    /// Searches never returned the record.
    NotVisible(SearchAttempts),
    /// A search returned the record.
    Visible(SearchAttempts),
}

/// Search until a query returns results or the budget is spent.
///
/// Performs at most `policy.max_attempts()` searches, pausing `policy.interval`
/// before each retry and never after the last attempt. Returns as soon as a
/// response has status 200 and a non-empty `results` array; otherwise returns
/// the final response. Transport errors end the loop immediately.
pub async fn search_until_visible(
    gateway: &dyn SearchGateway,
    request: &SearchRequest,
    policy: RetryPolicy,
    pause: &dyn Pause,
) -> Result<SearchAttempts, GatewayError> {
    let max_attempts = policy.max_attempts();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let response = gateway.search_persons(request).await?;

        if response.confirms_visibility() {
            debug!(term = %request.term, attempts, "search returned results");
            return Ok(SearchAttempts { response, attempts });
        }

        if attempts >= max_attempts {
            warn!(
                term = %request.term,
                attempts,
                status = response.status.as_u16(),
                "search retry budget exhausted"
            );
            return Ok(SearchAttempts { response, attempts });
        }

        debug!(
            term = %request.term,
            attempts,
            status = response.status.as_u16(),
            wait_ms = policy.interval.as_millis() as u64,
            "record not yet searchable; retrying"
        );
        pause.pause(policy.interval).await;
    }
}

/// Index a fixture, then confirm it is searchable.
///
/// Submits exactly one index write. If it is not accepted (202) no search is
/// made. Otherwise searches by the fixture's search term under `policy`.
pub async fn confirm_indexed(
    gateway: &dyn SearchGateway,
    fixture: &Fixture,
    policy: RetryPolicy,
    pause: &dyn Pause,
) -> Result<Confirmation, GatewayError> {
    let response = gateway.index_persons(&IndexRequest::single(fixture.record.clone())).await?;
    if !response.is_accepted() {
        warn!(
            state = %fixture.state,
            status = response.status.as_u16(),
            "index write not accepted"
        );
        return Ok(Confirmation::IndexRejected { response });
    }
    debug!(state = %fixture.state, "index write accepted");

    let searched = search_until_visible(gateway, &SearchRequest::for_term(&fixture.search_term), policy, pause).await?;
    if searched.is_visible() {
        info!(state = %fixture.state, attempts = searched.attempts, "fixture searchable");
        Ok(Confirmation::Visible(searched))
    } else {
        Ok(Confirmation::NotVisible(searched))
    }
}
