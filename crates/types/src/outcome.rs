//! Result of one state-change notification.

/// Classification of a single dispatcher invocation.
///
/// Each variant maps to the HTTP status and plain-text body returned to the
/// pact verifier. Outcomes are produced once per request and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request carried no usable `state`.
    NoStateProvided,
    /// No fixture is registered for the state; nothing to seed.
    UnrecognisedState { state: String },
    /// The index write was not accepted.
    IndexingFailed { state: String, status: u16 },
    /// The record never became visible within the retry budget.
    ConfirmationFailed { state: String, status: u16, attempts: u32 },
    /// The record was indexed and found by search.
    Confirmed { state: String, attempts: u32 },
    /// The search service could not be reached or authenticated against.
    TransportFailed { state: String, reason: String },
}

impl Outcome {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::NoStateProvided => 400,
            Outcome::UnrecognisedState { .. } | Outcome::Confirmed { .. } => 200,
            Outcome::IndexingFailed { .. } | Outcome::ConfirmationFailed { .. } | Outcome::TransportFailed { .. } => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code() == 200
    }

    /// Plain-text body reported to the caller.
    pub fn message(&self) -> String {
        match self {
            Outcome::NoStateProvided => "No state provided: request body must set a non-empty \"state\"".to_string(),
            Outcome::UnrecognisedState { state } => {
                format!("State '{state}' ignored: no fixture is registered for it")
            }
            Outcome::IndexingFailed { state, status } => {
                format!("Failed to index fixture for state '{state}': search service responded with status {status}")
            }
            Outcome::ConfirmationFailed { state, status, attempts } => format!(
                "Fixture for state '{state}' was not searchable after {attempts} attempts (last status {status})"
            ),
            Outcome::Confirmed { state, attempts } => {
                format!("Fixture for state '{state}' indexed and searchable after {attempts} attempt(s)")
            }
            Outcome::TransportFailed { state, reason } => {
                format!("Search service request failed for state '{state}': {reason}")
            }
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
