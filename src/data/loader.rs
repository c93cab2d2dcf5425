use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FetchError;
use crate::models::{Question, NUM_OPTIONS};

/// Filtered read against a question store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionQuery {
    pub subject: Option<String>,
    pub limit: Option<usize>,
}

impl QuestionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, question: &Question) -> bool {
        self.subject
            .as_deref()
            .is_none_or(|filter| subject_matches(filter, &question.subject))
    }

    /// Applies the subject filter and row limit to an ordered set.
    pub fn apply(&self, questions: impl IntoIterator<Item = Question>) -> Vec<Question> {
        let matching = questions.into_iter().filter(|q| self.matches(q));
        match self.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

/// Case-insensitive exact match on trimmed subject labels.
///
/// This is the only subject comparison in the crate; quizzes and mock exams
/// both go through it.
pub fn subject_matches(filter: &str, subject: &str) -> bool {
    filter.trim().to_lowercase() == subject.trim().to_lowercase()
}

/// Read-only source of questions.
pub trait QuestionStore: Send + Sync {
    /// Returns matching questions in store order. No match is an empty Vec,
    /// not an error.
    fn fetch(&self, query: &QuestionQuery) -> Result<Vec<Question>, FetchError>;
}

/// Question bank backed by a JSON array on disk. The file is re-read on each
/// fetch so edits show up without restarting.
#[derive(Debug, Clone)]
pub struct JsonQuestionStore {
    path: PathBuf,
}

impl JsonQuestionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuestionStore for JsonQuestionStore {
    fn fetch(&self, query: &QuestionQuery) -> Result<Vec<Question>, FetchError> {
        let questions = load_questions_from_json(&self.path)?;
        let selected = query.apply(questions);
        debug!(
            path = %self.path.display(),
            subject = query.subject.as_deref().unwrap_or("all"),
            count = selected.len(),
            "fetched questions"
        );
        Ok(selected)
    }
}

/// In-memory question bank.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuestionStore {
    questions: Vec<Question>,
}

impl MemoryQuestionStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl QuestionStore for MemoryQuestionStore {
    fn fetch(&self, query: &QuestionQuery) -> Result<Vec<Question>, FetchError> {
        Ok(query.apply(self.questions.iter().cloned()))
    }
}

/// Loads and validates every question in a JSON file.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, FetchError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions: Vec<Question> =
        serde_json::from_str(&json_content).map_err(|source| FetchError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(bad) = questions.iter().find(|q| q.correct_index >= NUM_OPTIONS) {
        return Err(FetchError::InvalidQuestion {
            id: bad.id.clone(),
            index: bad.correct_index,
        });
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn question(id: &str, subject: &str) -> Question {
        Question {
            id: id.to_string(),
            subject: subject.to_string(),
            text: format!("Question {}", id),
            options: [
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ],
            correct_index: 0,
            explanation: None,
        }
    }

    #[test]
    fn test_subject_matches_is_case_insensitive_exact() {
        assert!(subject_matches("english", "English"));
        assert!(subject_matches(" MATH ", "math"));
        assert!(!subject_matches("eng", "english"));
        assert!(!subject_matches("general", "general knowledge"));
    }

    #[test]
    fn test_query_filters_and_limits() {
        let store = MemoryQuestionStore::new(vec![
            question("1", "English"),
            question("2", "math"),
            question("3", "english"),
            question("4", "english"),
        ]);

        let all = store.fetch(&QuestionQuery::all()).unwrap();
        assert_eq!(all.len(), 4);

        let english = store.fetch(&QuestionQuery::subject("english")).unwrap();
        let ids: Vec<_> = english.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "4"]);

        let limited = store
            .fetch(&QuestionQuery::subject("ENGLISH").with_limit(2))
            .unwrap();
        assert_eq!(limited.len(), 2);

        let none = store.fetch(&QuestionQuery::subject("urdu")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_json_store_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let questions = vec![question("1", "english"), question("2", "math")];
        write!(file, "{}", serde_json::to_string(&questions).unwrap()).unwrap();

        let store = JsonQuestionStore::new(file.path());
        let math = store.fetch(&QuestionQuery::subject("Math")).unwrap();
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].id, "2");
    }

    #[test]
    fn test_explanation_is_optional() {
        let json = r#"[{"id":"q1","subject":"english","text":"Pick one",
            "options":["a","b","c","d"],"correct_index":2}]"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();

        let questions = load_questions_from_json(file.path()).unwrap();
        assert_eq!(questions[0].correct_index, 2);
        assert!(questions[0].explanation.is_none());
    }

    #[test]
    fn test_out_of_range_correct_index_is_rejected() {
        let mut bad = question("7", "math");
        bad.correct_index = 4;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&vec![bad]).unwrap()).unwrap();

        let err = load_questions_from_json(file.path()).unwrap_err();
        assert!(matches!(err, FetchError::InvalidQuestion { index: 4, .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonQuestionStore::new(dir.path().join("missing.json"));
        let err = store.fetch(&QuestionQuery::all()).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_questions_from_json(file.path()).unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }
}
