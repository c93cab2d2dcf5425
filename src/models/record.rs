//! Persisted attempt records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which history log a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Quiz,
    Mock,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 2] = [HistoryKind::Quiz, HistoryKind::Mock];

    /// Fixed persistence key for this kind's log.
    pub fn storage_key(self) -> &'static str {
        match self {
            HistoryKind::Quiz => "quizHistory",
            HistoryKind::Mock => "mockExamHistory",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HistoryKind::Quiz => "quiz",
            HistoryKind::Mock => "mock exam",
        }
    }
}

/// Rounded percentage in `0..=100`. A zero total yields 0.
pub fn percentage(score: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let value = (score.min(total) as f64 / total as f64 * 100.0).round();
    value as u8
}

/// Formats seconds as `MM:SS`.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub score: usize,
    pub total: usize,
    pub subject: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub percentage: u8,
}

impl QuizRecord {
    pub fn new(
        score: usize,
        total: usize,
        subject: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            score,
            total,
            subject,
            timestamp,
            percentage: percentage(score, total),
        }
    }
}

/// Correct/total tally for one subject within a mock exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTally {
    pub correct: usize,
    pub total: usize,
}

impl SubjectTally {
    pub fn percentage(&self) -> u8 {
        percentage(self.correct, self.total)
    }
}

/// Per-subject breakdown, ordered by subject name.
pub type Breakdown = BTreeMap<String, SubjectTally>;

/// One finished mock exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockExamRecord {
    pub score: usize,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
    pub elapsed_secs: u64,
    #[serde(default)]
    pub breakdown: Breakdown,
}

impl MockExamRecord {
    pub fn percentage(&self) -> u8 {
        percentage(self.score, self.total)
    }

    pub fn time_spent(&self) -> String {
        format_clock(self.elapsed_secs)
    }
}

/// A record tagged with its kind, as shown in the unified history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryEntry {
    Quiz(QuizRecord),
    Mock(MockExamRecord),
}

impl HistoryEntry {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryEntry::Quiz(_) => HistoryKind::Quiz,
            HistoryEntry::Mock(_) => HistoryKind::Mock,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::Quiz(record) => record.timestamp,
            HistoryEntry::Mock(record) => record.timestamp,
        }
    }

    pub fn score(&self) -> usize {
        match self {
            HistoryEntry::Quiz(record) => record.score,
            HistoryEntry::Mock(record) => record.score,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            HistoryEntry::Quiz(record) => record.total,
            HistoryEntry::Mock(record) => record.total,
        }
    }

    pub fn percentage(&self) -> u8 {
        match self {
            HistoryEntry::Quiz(record) => record.percentage,
            HistoryEntry::Mock(record) => record.percentage(),
        }
    }

    /// Display title, e.g. "English Quiz" or "Mock Exam".
    pub fn title(&self) -> String {
        match self {
            HistoryEntry::Quiz(record) => match record.subject.as_deref() {
                Some(subject) => format!("{} Quiz", capitalize(subject)),
                None => "General Quiz".to_string(),
            },
            HistoryEntry::Mock(_) => "Mock Exam".to_string(),
        }
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(1800), "30:00");
    }

    #[test]
    fn test_entry_title() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let quiz = HistoryEntry::Quiz(QuizRecord::new(1, 2, Some("english".to_string()), at));
        assert_eq!(quiz.title(), "English Quiz");
        assert_eq!(quiz.percentage(), 50);

        let general = HistoryEntry::Quiz(QuizRecord::new(1, 2, None, at));
        assert_eq!(general.title(), "General Quiz");
    }

    #[test]
    fn test_entry_serialization_is_tagged() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let entry = HistoryEntry::Mock(MockExamRecord {
            score: 3,
            total: 4,
            timestamp: at,
            elapsed_secs: 90,
            breakdown: Breakdown::new(),
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"mock\""));

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), HistoryKind::Mock);
    }
}
