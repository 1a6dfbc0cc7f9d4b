//! Provider-state fixture table.
//!
//! Fixtures are read once at start-up and never mutated. Each entry maps a
//! provider-state name, exactly as the pact consumer wrote it, to the record
//! that must exist in the search service for that state to hold.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use pact_state_types::FixtureRecord;
use thiserror::Error;
use tracing::debug;

const EMBEDDED_FIXTURES: &str = include_str!("../fixtures/persons.json");

/// A fixture resolved for one provider state.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub state: String,
    pub record: FixtureRecord,
    /// Term used to find the record once indexed.
    pub search_term: String,
}

/// Errors raised while loading a fixture table.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("could not read fixtures from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixtures must be a JSON object of state name to record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fixture for state '{state}' has no firstname to search by")]
    MissingSearchTerm { state: String },
}

/// Read-only lookup from provider-state name to fixture.
#[derive(Debug, Clone, Default)]
pub struct FixtureTable {
    fixtures: IndexMap<String, Fixture>,
}

impl FixtureTable {
    /// The fixtures bundled with the harness.
    pub fn embedded() -> Result<Self, FixtureError> {
        Self::from_json(EMBEDDED_FIXTURES)
    }

    /// Load fixtures from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&content)?;
        debug!(path = %path.display(), fixtures = table.len(), "loaded fixture table");
        Ok(table)
    }

    /// Parse fixtures from JSON text.
    pub fn from_json(content: &str) -> Result<Self, FixtureError> {
        let records: IndexMap<String, FixtureRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    /// Build a table from already-parsed records.
    ///
    /// Every record must carry a search term, otherwise its visibility could
    /// never be confirmed.
    pub fn from_records(records: IndexMap<String, FixtureRecord>) -> Result<Self, FixtureError> {
        let mut fixtures = IndexMap::with_capacity(records.len());
        for (state, record) in records {
            let search_term = record
                .search_term()
                .ok_or_else(|| FixtureError::MissingSearchTerm { state: state.clone() })?
                .to_string();
            fixtures.insert(
                state.clone(),
                Fixture {
                    state,
                    record,
                    search_term,
                },
            );
        }
        Ok(Self { fixtures })
    }

    pub fn get(&self, state: &str) -> Option<&Fixture> {
        self.fixtures.get(state)
    }

    /// State names in authoring order.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.fixtures.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;

    const PETER: &str = "Person called Peter with person type type1 has been indexed";

    #[test]
    fn embedded_table_covers_consumer_states() -> Result<()> {
        let table = FixtureTable::embedded()?;
        assert_eq!(table.len(), 3);

        let peter = table.get(PETER).expect("peter fixture");
        assert_eq!(peter.search_term, "Peter");
        assert_eq!(peter.record.get("personType").and_then(|v| v.as_str()), Some("type1"));

        let by_uid = table.get("Person with UID 7000-8813-9100 has been indexed").expect("uid fixture");
        assert_eq!(by_uid.record.get("uId").and_then(|v| v.as_str()), Some("7000-8813-9100"));

        assert!(table.get("some-unknown-fixture").is_none());
        Ok(())
    }

    #[test]
    fn states_keep_file_order() -> Result<()> {
        let table = FixtureTable::from_json(r#"{"b": {"firstname": "B"}, "a": {"firstname": "A"}}"#)?;
        assert_eq!(table.states().collect::<Vec<_>>(), vec!["b", "a"]);
        Ok(())
    }

    #[test]
    fn records_without_firstname_are_rejected() {
        let error = FixtureTable::from_json(r#"{"nameless": {"uId": "7000-0000-0002"}}"#).unwrap_err();
        assert!(matches!(error, FixtureError::MissingSearchTerm { ref state } if state == "nameless"));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(matches!(FixtureTable::from_json("[]"), Err(FixtureError::Parse(_))));
    }

    #[test]
    fn load_from_path_reads_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"custom state": {{"firstname": "Ada", "surname": "Lovelace"}}}}"#)?;

        let table = FixtureTable::load_from_path(file.path())?;
        assert_eq!(table.get("custom state").map(|fixture| fixture.search_term.as_str()), Some("Ada"));
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let error = FixtureTable::load_from_path(Path::new("/nonexistent/fixtures.json")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/fixtures.json"));
    }
}
