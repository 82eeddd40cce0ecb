//! Ordinance lookup.
//!
//! Provides the `OrdinanceSource` trait and two implementations: an
//! in-memory table (seeded or loaded once from JSON) and a file-backed
//! source that reads its JSON table on every lookup. An unsupported
//! jurisdiction is an ordinary `Ok(None)`; only a failing backing store
//! is an error.

mod seed;

use petclause_model::{Jurisdiction, Ordinance};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from ordinance source operations.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Ordinance store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid ordinance table: {0}")]
    InvalidTable(String),
}

/// Trait for jurisdiction → ordinance text stores.
pub trait OrdinanceSource {
    /// Return the full ordinance text for a jurisdiction, or `None` when the
    /// jurisdiction is not supported.
    fn lookup(&self, jurisdiction: &Jurisdiction) -> Result<Option<Ordinance>, LookupError>;

    /// The supported jurisdiction set.
    fn jurisdictions(&self) -> Result<Vec<Jurisdiction>, LookupError>;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// Static keyed table of ordinance text.
#[derive(Debug, Clone, Default)]
pub struct OrdinanceTable {
    /// Keyed by `Jurisdiction::key()`
    entries: BTreeMap<String, Ordinance>,
}

impl OrdinanceTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with the built-in jurisdictions.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (name, text) in seed::entries() {
            // Seed names are non-empty literals
            if let Ok(jurisdiction) = Jurisdiction::new(name) {
                table.insert(jurisdiction, text);
            }
        }
        table
    }

    /// Parse a JSON object of `{"City": "ordinance text", ...}`.
    pub fn from_json(json: &str) -> Result<Self, LookupError> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|e| LookupError::InvalidTable(e.to_string()))?;

        let mut table = Self::new();
        for (name, text) in raw {
            let jurisdiction = Jurisdiction::new(&name)
                .map_err(|_| LookupError::InvalidTable("blank jurisdiction name".to_string()))?;
            if text.trim().is_empty() {
                return Err(LookupError::InvalidTable(format!(
                    "empty ordinance text for {}",
                    name
                )));
            }
            if let Some(existing) = table.entries.get(&jurisdiction.key()) {
                return Err(LookupError::InvalidTable(format!(
                    "{} and {} name the same jurisdiction",
                    existing.jurisdiction(),
                    name
                )));
            }
            table.insert(jurisdiction, text);
        }
        Ok(table)
    }

    /// Load a JSON table from disk once.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LookupError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, jurisdiction: Jurisdiction, text: impl Into<String>) {
        let key = jurisdiction.key();
        self.entries.insert(key, Ordinance::new(jurisdiction, text));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OrdinanceSource for OrdinanceTable {
    fn lookup(&self, jurisdiction: &Jurisdiction) -> Result<Option<Ordinance>, LookupError> {
        let found = self.entries.get(&jurisdiction.key()).cloned();
        debug!(jurisdiction = %jurisdiction, found = found.is_some(), "Ordinance lookup");
        Ok(found)
    }

    fn jurisdictions(&self) -> Result<Vec<Jurisdiction>, LookupError> {
        Ok(self
            .entries
            .values()
            .map(|o| o.jurisdiction().clone())
            .collect())
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

/// JSON table re-read from disk on every lookup.
///
/// Edits to the file take effect without a restart; a missing or unreadable
/// file surfaces as `LookupError::Unavailable` rather than `None`.
#[derive(Debug, Clone)]
pub struct OrdinanceFile {
    path: PathBuf,
}

impl OrdinanceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<OrdinanceTable, LookupError> {
        OrdinanceTable::from_json_file(&self.path)
    }
}

impl OrdinanceSource for OrdinanceFile {
    fn lookup(&self, jurisdiction: &Jurisdiction) -> Result<Option<Ordinance>, LookupError> {
        self.load()?.lookup(jurisdiction)
    }

    fn jurisdictions(&self) -> Result<Vec<Jurisdiction>, LookupError> {
        self.load()?.jurisdictions()
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
