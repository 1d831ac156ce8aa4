use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::game::{Move, Piece, NO_PIECE};

/// Magnitude stored for a won or lost position.
pub const WIN_EVALUATION: i8 = 10;

/// A cached search result for one board key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspositionEntry {
    pub evaluation: i8,
    pub position: u8,
    /// `16` when no piece is handed over.
    pub piece: Piece,
}

impl TranspositionEntry {
    /// Infinite scores are stored as +/-[`WIN_EVALUATION`].
    pub fn new(score: f64, mv: Move) -> Self {
        let evaluation = if score == f64::INFINITY {
            WIN_EVALUATION
        } else if score == f64::NEG_INFINITY {
            -WIN_EVALUATION
        } else {
            score.round().clamp(i8::MIN as f64, i8::MAX as f64) as i8
        };
        TranspositionEntry {
            evaluation,
            position: mv.position,
            piece: mv.next_piece.unwrap_or(NO_PIECE),
        }
    }

    pub fn score(&self) -> f64 {
        f64::from(self.evaluation)
    }

    pub fn best_move(&self) -> Move {
        let next_piece = (self.piece != NO_PIECE).then_some(self.piece);
        Move::new(self.position, next_piece)
    }
}

/// Key-value capability the negamax agent caches root results in.
pub trait TranspositionStore {
    fn get(&self, key: &str) -> Option<TranspositionEntry>;

    fn put(&mut self, key: String, entry: TranspositionEntry);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist pending writes, if the store is backed by anything.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, TranspositionEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranspositionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<TranspositionEntry> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: String, entry: TranspositionEntry) {
        self.entries.insert(key, entry);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Store persisted as a JSON object of board key to entry.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, TranspositionEntry>,
    dirty: bool,
}

impl JsonFileStore {
    /// Load the table at `path`; a missing file opens an empty table.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = if path.exists() {
            let json = fs::read_to_string(path).map_err(|e| StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
            serde_json::from_str(&json).map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            BTreeMap::new()
        };
        log::debug!(
            "opened transposition table {} with {} entries",
            path.display(),
            entries.len()
        );
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranspositionStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<TranspositionEntry> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: String, entry: TranspositionEntry) {
        self.entries.insert(key, entry);
        self.dirty = true;
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Write to a temporary sibling and rename over the table.
    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(&self.entries)?)?;
        fs::rename(&tmp_path, &self.path)?;
        self.dirty = false;
        log::debug!(
            "saved {} transposition entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_clamps_infinite_scores() {
        let win = TranspositionEntry::new(f64::INFINITY, Move::new(3, Some(7)));
        assert_eq!(win.evaluation, 10);
        let loss = TranspositionEntry::new(f64::NEG_INFINITY, Move::new(3, None));
        assert_eq!(loss.evaluation, -10);
        assert_eq!(loss.piece, 16);
        assert_eq!(loss.best_move(), Move::new(3, None));
        assert_eq!(TranspositionEntry::new(2.0, Move::new(0, Some(1))).score(), 2.0);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        let entry = TranspositionEntry::new(1.0, Move::new(5, Some(2)));
        store.put("key".to_string(), entry);
        assert_eq!(store.get("key"), Some(entry));
        assert_eq!(store.get("other"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables").join("negamax.json");
        let entry = TranspositionEntry::new(f64::INFINITY, Move::new(15, Some(0)));

        let mut store = JsonFileStore::open(&path).unwrap();
        store.put("abc".to_string(), entry);
        store.flush().unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("abc"), Some(entry));
    }

    #[test]
    fn test_json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
