//! Shared data model for the provider-state harness.
//!
//! These types describe the payloads exchanged with the pact verifier
//! (state-change requests) and with the downstream search service (index and
//! search bodies). They carry no behaviour beyond small accessors so that the
//! api, engine and server crates agree on one wire shape.

mod outcome;

pub use outcome::Outcome;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page size used for every confirmation search.
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Field of a fixture record used as the confirmation search term.
pub const SEARCH_TERM_FIELD: &str = "firstname";

/// Canned data backing one provider state.
///
/// The record is kept as an ordered JSON object so it is submitted to the
/// search service exactly as authored in the fixture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureRecord(Map<String, Value>);

impl FixtureRecord {
    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Term used to confirm the record became searchable.
    ///
    /// The `firstname` string exactly as authored; `None` when it is missing
    /// or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.get(SEARCH_TERM_FIELD)
            .and_then(Value::as_str)
            .filter(|term| !term.trim().is_empty())
    }
}

/// Body of a `POST /persons` write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub persons: Vec<FixtureRecord>,
}

impl IndexRequest {
    /// Build a write containing exactly one record.
    pub fn single(record: FixtureRecord) -> Self {
        Self { persons: vec![record] }
    }
}

/// Body of a `POST /persons/search` read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub term: String,
    pub size: u32,
    pub from: u32,
}

impl SearchRequest {
    /// Query the first page of results for `term`.
    pub fn for_term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            size: SEARCH_PAGE_SIZE,
            from: 0,
        }
    }
}

/// Search service response body.
///
/// Only `results` matters for confirmation; the remaining fields are kept so
/// that logs show what the service reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub total: Option<SearchTotal>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Hit count reported alongside search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTotal {
    pub count: u64,
    #[serde(default)]
    pub exact: bool,
}

/// Phase of the verifier's state-change lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateAction {
    Setup,
    Teardown,
}

impl std::fmt::Display for StateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateAction::Setup => write!(f, "setup"),
            StateAction::Teardown => write!(f, "teardown"),
        }
    }
}

/// Notification sent by the pact verifier before and after an interaction.
///
/// ```json
/// {"action": "setup", "params": {}, "state": "Person with UID 7000-8813-9100 has been indexed"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateChangeRequest {
    #[serde(default)]
    pub action: Option<StateAction>,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub state: Option<String>,
}

impl StateChangeRequest {
    /// Convenience constructor for a setup notification.
    pub fn setup(state: impl Into<String>) -> Self {
        Self {
            action: Some(StateAction::Setup),
            params: Map::new(),
            state: Some(state.into()),
        }
    }

    /// The requested state; absent, `null` and `""` all read as no state.
    pub fn state_name(&self) -> Option<&str> {
        self.state.as_deref().filter(|state| !state.is_empty())
    }
}
