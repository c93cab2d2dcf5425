mod question;
mod record;

pub use question::{Question, NUM_OPTIONS, OPTION_LABELS};
pub use record::{
    format_clock, percentage, Breakdown, HistoryEntry, HistoryKind, MockExamRecord, QuizRecord,
    SubjectTally,
};

pub(crate) use record::capitalize;
