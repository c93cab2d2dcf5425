use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::models::{HistoryEntry, HistoryKind, MockExamRecord, QuizRecord};
use crate::storage::{KeyValueStore, MemoryStore};

/// Maximum retained records per kind.
pub const HISTORY_LIMIT: usize = 10;

/// What to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    Kind(HistoryKind),
    All,
}

impl ClearScope {
    pub fn includes(self, kind: HistoryKind) -> bool {
        match self {
            ClearScope::Kind(k) => k == kind,
            ClearScope::All => true,
        }
    }
}

/// Handle to the persisted history logs. Cheap to clone; clones share the
/// same backend.
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Inserts at the head of its kind's log and drops anything past
    /// [`HISTORY_LIMIT`]. Failures are logged and swallowed.
    pub fn append(&self, entry: HistoryEntry) {
        let kind = entry.kind();
        if let Err(e) = self.try_append(entry) {
            warn!(kind = kind.storage_key(), error = %e, "failed to save history record");
        }
    }

    pub fn try_append(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        let kind = entry.kind();
        // Unreadable logs are reset rather than blocking the append.
        let mut entries = self.load(kind).unwrap_or_default();
        entries.insert(0, entry);
        entries.truncate(HISTORY_LIMIT);
        self.save(kind, &entries)?;
        debug!(kind = kind.storage_key(), retained = entries.len(), "history record saved");
        Ok(())
    }

    /// The retained log for `kind`, newest first. Unreadable data reads as
    /// an empty log.
    pub fn read_all(&self, kind: HistoryKind) -> Vec<HistoryEntry> {
        self.load(kind).unwrap_or_else(|e| {
            warn!(kind = kind.storage_key(), error = %e, "discarding unreadable history");
            Vec::new()
        })
    }

    pub fn clear(&self, scope: ClearScope) -> Result<(), StorageError> {
        let keys: Vec<&str> = HistoryKind::ALL
            .into_iter()
            .filter(|kind| scope.includes(*kind))
            .map(HistoryKind::storage_key)
            .collect();
        self.backend.remove_all(&keys)?;
        info!(?scope, "history cleared");
        Ok(())
    }

    fn load(&self, kind: HistoryKind) -> Result<Vec<HistoryEntry>, StorageError> {
        let Some(raw) = self.backend.get(kind.storage_key())? else {
            return Ok(Vec::new());
        };
        let entries = match kind {
            HistoryKind::Quiz => decode::<QuizRecord>(&raw)?
                .into_iter()
                .map(HistoryEntry::Quiz)
                .collect(),
            HistoryKind::Mock => decode::<MockExamRecord>(&raw)?
                .into_iter()
                .map(HistoryEntry::Mock)
                .collect(),
        };
        Ok(entries)
    }

    fn save(&self, kind: HistoryKind, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let value = match kind {
            HistoryKind::Quiz => encode(entries.iter().filter_map(|entry| match entry {
                HistoryEntry::Quiz(record) => Some(record),
                HistoryEntry::Mock(_) => None,
            }))?,
            HistoryKind::Mock => encode(entries.iter().filter_map(|entry| match entry {
                HistoryEntry::Mock(record) => Some(record),
                HistoryEntry::Quiz(_) => None,
            }))?,
        };
        self.backend.set(kind.storage_key(), &value)
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

fn encode<'a, T: Serialize + 'a>(
    records: impl Iterator<Item = &'a T>,
) -> Result<String, StorageError> {
    let records: Vec<&T> = records.collect();
    Ok(serde_json::to_string(&records)?)
}
