//! Scholar roster: account id -> display name, persisted as pretty JSON.
//!
//! Keys are kept in a BTreeMap so iteration order, persisted order, and the
//! "first match" rule for name-based removal are all the same deterministic
//! key order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, RosterError};

/// Mapping from account id to display name (may be empty).
pub type Roster = BTreeMap<String, String>;

/// What `RosterStore::load` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file at the configured path (or no path configured).
    Absent,
    /// File existed but was not a JSON object of strings; treated as empty.
    Corrupt,
    /// File parsed; roster holds its entries.
    Loaded,
}

/// An entry removed from the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
    pub id: String,
    pub name: String,
}

/// Owns the roster mapping and its persistence.
#[derive(Debug, Clone)]
pub struct RosterStore {
    path: Option<PathBuf>,
    entries: Roster,
}

impl RosterStore {
    /// Create an empty store that persists to `path` (in-memory only when `None`).
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            entries: Roster::new(),
        }
    }

    /// Load the persisted roster. Absent and corrupt files both yield an
    /// empty roster; the outcome tells the caller which case it was.
    pub fn load(path: Option<PathBuf>) -> (Self, LoadOutcome) {
        let mut store = Self::new(path);

        let Some(path) = store.path.clone() else {
            return (store, LoadOutcome::Absent);
        };
        if !path.is_file() {
            return (store, LoadOutcome::Absent);
        }

        let outcome = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Roster>(&raw) {
                Ok(entries) => {
                    info!(path = %path.display(), count = entries.len(), "loaded roster");
                    store.entries = entries;
                    LoadOutcome::Loaded
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "roster file corrupt, starting empty");
                    LoadOutcome::Corrupt
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "roster file unreadable, starting empty");
                LoadOutcome::Corrupt
            }
        };

        (store, outcome)
    }

    /// Persist the roster as pretty JSON with stable key order.
    /// No-op when no path is configured.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), count = self.entries.len(), "saved roster");
        Ok(())
    }

    /// Insert a scholar. Fails on an empty id or a duplicate; callers
    /// persist with `save` after a successful mutation.
    pub fn add(&mut self, id: &str, name: &str) -> std::result::Result<(), RosterError> {
        if id.is_empty() {
            return Err(RosterError::EmptyId);
        }
        if self.entries.contains_key(id) {
            return Err(RosterError::AlreadyExists { id: id.to_string() });
        }
        self.entries.insert(id.to_string(), name.to_string());
        Ok(())
    }

    /// Remove by account id, or failing that, by the first display-name match
    /// in key order. The whole roster is scanned before reporting NotFound.
    pub fn remove(&mut self, key: &str) -> std::result::Result<RemovedEntry, RosterError> {
        if let Some(name) = self.entries.remove(key) {
            return Ok(RemovedEntry {
                id: key.to_string(),
                name,
            });
        }

        let matched = self
            .entries
            .iter()
            .find(|(_, name)| name.as_str() == key)
            .map(|(id, _)| id.clone());

        match matched {
            Some(id) => {
                let name = self.entries.remove(&id).unwrap_or_default();
                Ok(RemovedEntry { id, name })
            }
            None => Err(RosterError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    pub fn entries(&self) -> &Roster {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, &str)]) -> RosterStore {
        let mut store = RosterStore::new(None);
        for (id, name) in entries {
            store.add(id, name).unwrap();
        }
        store
    }

    #[test]
    fn add_empty_id_rejected() {
        let mut store = RosterStore::new(None);
        assert_eq!(store.add("", "Alice"), Err(RosterError::EmptyId));
        assert!(store.is_empty());
    }

    #[test]
    fn add_duplicate_never_mutates() {
        let mut store = store_with(&[("0xA", "Alice")]);
        let err = store.add("0xA", "Other").unwrap_err();
        assert_eq!(
            err,
            RosterError::AlreadyExists {
                id: "0xA".to_string()
            }
        );
        assert_eq!(store.entries().get("0xA").unwrap(), "Alice");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_by_id() {
        let mut store = store_with(&[("0xA", "Alice"), ("0xB", "Bob")]);
        let removed = store.remove("0xA").unwrap();
        assert_eq!(removed.id, "0xA");
        assert_eq!(removed.name, "Alice");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_by_name_takes_first_match_in_key_order() {
        let mut store = store_with(&[("0xC", "Dup"), ("0xA", "Dup"), ("0xB", "Bob")]);
        let removed = store.remove("Dup").unwrap();
        assert_eq!(removed.id, "0xA");
        assert!(store.entries().contains_key("0xC"));
    }

    #[test]
    fn remove_missing_never_mutates() {
        let mut store = store_with(&[("0xA", "Alice")]);
        let err = store.remove("nobody").unwrap_err();
        assert_eq!(
            err,
            RosterError::NotFound {
                key: "nobody".to_string()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_absent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        let (store, outcome) = RosterStore::load(Some(path));
        assert_eq!(outcome, LoadOutcome::Absent);
        assert!(store.is_empty());
    }

    #[test]
    fn load_corrupt_is_empty_and_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "not json {").unwrap();
        let (store, outcome) = RosterStore::load(Some(path));
        assert_eq!(outcome, LoadOutcome::Corrupt);
        assert!(store.is_empty());
    }

    #[test]
    fn save_without_path_is_noop() {
        let store = store_with(&[("0xA", "Alice")]);
        store.save().unwrap();
    }

    #[test]
    fn save_load_round_trip_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");

        let mut store = RosterStore::new(Some(path.clone()));
        store.add("0xB", "").unwrap();
        store.add("0xA", "Alice").unwrap();
        store.save().unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        let (reloaded, outcome) = RosterStore::load(Some(path.clone()));
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(reloaded.entries(), store.entries());

        reloaded.save().unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }
}
