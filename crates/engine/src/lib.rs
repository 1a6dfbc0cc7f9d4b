//! # Provider-state engine
//!
//! Turns a pact verifier state-change notification into seeded, searchable
//! data in the search service.
//!
//! ## Modules
//!
//! - **`fixtures`**: the read-only table mapping provider-state names to records
//! - **`confirm`**: index-then-search with a bounded, fixed-interval retry budget
//! - **`dispatcher`**: classifies a notification into an [`Outcome`]
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use pact_state_api::{JwtTokenProvider, SearchServiceClient};
//! use pact_state_engine::{Dispatcher, FixtureTable};
//! use pact_state_types::StateChangeRequest;
//!
//! let client = SearchServiceClient::new("http://localhost:8000", &JwtTokenProvider::default())?;
//! let dispatcher = Dispatcher::new(FixtureTable::embedded()?, Arc::new(client));
//! let outcome = dispatcher
//!     .handle(&StateChangeRequest::setup("Person with UID 7000-8813-9100 has been indexed"))
//!     .await;
//! println!("{} {}", outcome.status_code(), outcome);
//! ```

pub mod confirm;
pub mod dispatcher;
pub mod fixtures;

#[cfg(test)]
mod testing;

pub use confirm::{
    Confirmation, DEFAULT_RETRY_INTERVAL, DEFAULT_SEARCH_RETRIES, Pause, RetryPolicy, SearchAttempts, TokioPause, confirm_indexed,
    search_until_visible,
};
pub use dispatcher::Dispatcher;
pub use fixtures::{Fixture, FixtureError, FixtureTable};
pub use pact_state_types::Outcome;
