//! Attempt history: the bounded per-kind logs and the unified view over them.

mod store;
mod view;

pub use store::{ClearScope, HistoryStore, HISTORY_LIMIT};
pub use view::{HistoryFilter, HistorySummary, HistoryView};
