use crate::error::StorageError;
use crate::models::{HistoryEntry, HistoryKind};

use super::store::{ClearScope, HistoryStore};

/// History tab selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    Quiz,
    Mock,
}

impl HistoryFilter {
    pub const TABS: [HistoryFilter; 3] =
        [HistoryFilter::All, HistoryFilter::Quiz, HistoryFilter::Mock];

    pub fn matches(self, kind: HistoryKind) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Quiz => kind == HistoryKind::Quiz,
            HistoryFilter::Mock => kind == HistoryKind::Mock,
        }
    }

    pub fn kind(self) -> Option<HistoryKind> {
        match self {
            HistoryFilter::All => None,
            HistoryFilter::Quiz => Some(HistoryKind::Quiz),
            HistoryFilter::Mock => Some(HistoryKind::Mock),
        }
    }

    /// The clear action that matches this tab.
    pub fn clear_scope(self) -> ClearScope {
        match self.kind() {
            Some(kind) => ClearScope::Kind(kind),
            None => ClearScope::All,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            HistoryFilter::All => "All History",
            HistoryFilter::Quiz => "Quizzes",
            HistoryFilter::Mock => "Mock Exams",
        }
    }

    pub fn next(self) -> Self {
        match self {
            HistoryFilter::All => HistoryFilter::Quiz,
            HistoryFilter::Quiz => HistoryFilter::Mock,
            HistoryFilter::Mock => HistoryFilter::All,
        }
    }
}

/// Aggregate numbers for a filtered slice of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub attempts: usize,
    pub average_percentage: u8,
    pub best_percentage: u8,
}

/// Quiz and mock exam records merged into one list, newest first.
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    entries: Vec<HistoryEntry>,
}

impl HistoryView {
    /// Reads both logs from the store and merges them.
    pub fn load(store: &HistoryStore) -> Self {
        Self::merge(
            store.read_all(HistoryKind::Quiz),
            store.read_all(HistoryKind::Mock),
        )
    }

    pub fn merge(quiz: Vec<HistoryEntry>, mock: Vec<HistoryEntry>) -> Self {
        let mut entries = quiz;
        entries.extend(mock);
        // Stable sort keeps store order for equal timestamps.
        entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching `filter`, in the already-sorted order.
    pub fn filtered(&self, filter: HistoryFilter) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| filter.matches(entry.kind()))
    }

    pub fn summary(&self, filter: HistoryFilter) -> HistorySummary {
        let percentages: Vec<u8> = self.filtered(filter).map(HistoryEntry::percentage).collect();
        if percentages.is_empty() {
            return HistorySummary::default();
        }
        let sum: usize = percentages.iter().map(|p| *p as usize).sum();
        let average = (sum as f64 / percentages.len() as f64).round() as u8;
        HistorySummary {
            attempts: percentages.len(),
            average_percentage: average,
            best_percentage: percentages.iter().copied().max().unwrap_or(0),
        }
    }

    /// Removes the persisted records for `scope`, then drops them from this
    /// view. On a storage failure the view is left untouched.
    pub fn clear(&mut self, store: &HistoryStore, scope: ClearScope) -> Result<(), StorageError> {
        store.clear(scope)?;
        self.entries.retain(|entry| !scope.includes(entry.kind()));
        Ok(())
    }
}
