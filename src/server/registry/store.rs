//! Persistence backends for match records.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

use crate::error::PersistenceError;
use crate::game::types::MatchId;
use crate::server::registry::matches::Match;

/// Durable sink for match records. `save` is called synchronously on every
/// lifecycle change; an error aborts the change that triggered it.
pub trait MatchStore: Send + Sync {
    fn save(&self, record: &Match) -> Result<(), PersistenceError>;
    fn remove(&self, match_id: MatchId) -> Result<(), PersistenceError>;
}

/// Keeps the latest version of every record in memory.
#[derive(Default)]
pub struct InMemoryMatchStore {
    records: RwLock<HashMap<MatchId, Match>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, match_id: MatchId) -> Option<Match> {
        self.records.read().get(&match_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

impl MatchStore for InMemoryMatchStore {
    fn save(&self, record: &Match) -> Result<(), PersistenceError> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    fn remove(&self, match_id: MatchId) -> Result<(), PersistenceError> {
        self.records.write().remove(&match_id);
        Ok(())
    }
}

/// Append-only JSON-lines log: one line per saved version, and a tombstone
/// line for removed records.
pub struct JsonLinesMatchStore {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesMatchStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &serde_json::Value) -> Result<(), PersistenceError> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl MatchStore for JsonLinesMatchStore {
    fn save(&self, record: &Match) -> Result<(), PersistenceError> {
        self.append(&serde_json::to_value(record)?)
    }

    fn remove(&self, match_id: MatchId) -> Result<(), PersistenceError> {
        self.append(&serde_json::json!({ "removed": match_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn test_json_lines_store_appends_versions() {
        let path = std::env::temp_dir().join(format!("matches-{}.jsonl", Uuid::new_v4()));
        let store = JsonLinesMatchStore::open(&path).unwrap();
        let mut record = Match::new("tic-tac-toe".into(), vec!["a".into(), "b".into()]);
        store.save(&record).unwrap();
        record.start().unwrap();
        store.save(&record).unwrap();
        store.remove(record.id).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let last_version: Match = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(last_version, record);
        assert!(lines[2].contains("removed"));
        let _ = fs::remove_file(&path);
    }
}
