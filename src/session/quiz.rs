use chrono::Utc;
use tracing::info;

use crate::data::{QuestionQuery, QuestionStore};
use crate::error::{QuizError, Result};
use crate::history::HistoryStore;
use crate::models::{percentage, HistoryEntry, Question, QuizRecord, NUM_OPTIONS};

use super::{review, score_answers, AnswerOutcome, AnswerResult, SessionStatus};

/// Sequential quiz over one subject, or over everything when no subject is
/// given.
pub struct QuizSession {
    subject: Option<String>,
    questions: Vec<Question>,
    position: usize,
    answers: Vec<usize>,
    score: Option<usize>,
    status: SessionStatus,
    history: HistoryStore,
}

impl QuizSession {
    pub fn new(subject: Option<String>, history: HistoryStore) -> Self {
        Self {
            subject,
            questions: Vec::new(),
            position: 0,
            answers: Vec::new(),
            score: None,
            status: SessionStatus::NotStarted,
            history,
        }
    }

    /// Fetches the question set for `subject`. An empty result is reported
    /// as [`QuizError::EmptyResult`], distinct from a fetch failure.
    pub fn fetch(store: &dyn QuestionStore, subject: Option<&str>) -> Result<Vec<Question>> {
        let query = QuestionQuery {
            subject: subject.map(str::to_string),
            limit: None,
        };
        let questions = store.fetch(&query)?;
        if questions.is_empty() {
            return Err(QuizError::EmptyResult {
                subject: subject.map(str::to_string),
            });
        }
        info!(subject = subject.unwrap_or("all"), count = questions.len(), "quiz questions loaded");
        Ok(questions)
    }

    /// Marks a fetch as pending. Answers are rejected until [`start`](Self::start).
    pub fn begin_loading(&mut self) {
        self.status = SessionStatus::Loading;
    }

    /// A fetch failed; the session goes back to not started with no partial
    /// state.
    pub fn abort_loading(&mut self) {
        self.questions.clear();
        self.reset_progress();
        self.status = SessionStatus::NotStarted;
    }

    pub fn start(&mut self, questions: Vec<Question>) -> Result<()> {
        if questions.is_empty() {
            return Err(QuizError::EmptyResult {
                subject: self.subject.clone(),
            });
        }
        self.questions = questions;
        self.reset_progress();
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Records `choice` (a true option index) for the current question.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerOutcome> {
        match self.status {
            SessionStatus::InProgress => {}
            SessionStatus::Finished => return Err(QuizError::InvalidState("quiz already finished")),
            SessionStatus::Loading => {
                return Err(QuizError::InvalidState("questions still loading"));
            }
            SessionStatus::NotStarted => return Err(QuizError::InvalidState("quiz not started")),
        }
        if choice >= NUM_OPTIONS {
            return Err(QuizError::InvalidState("option index out of range"));
        }
        if self.answers.len() >= self.questions.len() {
            return Err(QuizError::InvalidState("no question left to answer"));
        }

        self.answers.push(choice);

        if self.position + 1 >= self.questions.len() {
            Ok(self.finish())
        } else {
            self.position += 1;
            Ok(AnswerOutcome::Next {
                position: self.position,
            })
        }
    }

    /// Starts over with the same questions.
    pub fn restart(&mut self) -> Result<()> {
        match self.status {
            SessionStatus::InProgress | SessionStatus::Finished => {
                self.reset_progress();
                self.status = SessionStatus::InProgress;
                Ok(())
            }
            _ => Err(QuizError::InvalidState("nothing to restart")),
        }
    }

    fn finish(&mut self) -> AnswerOutcome {
        let score = score_answers(&self.questions, &self.answers);
        let total = self.questions.len();
        self.score = Some(score);
        self.status = SessionStatus::Finished;

        info!(
            subject = self.subject.as_deref().unwrap_or("all"),
            score, total, "quiz finished"
        );
        self.history.append(HistoryEntry::Quiz(QuizRecord::new(
            score,
            total,
            self.subject.clone(),
            Utc::now(),
        )));

        AnswerOutcome::Finished { score, total }
    }

    fn reset_progress(&mut self) {
        self.position = 0;
        self.answers.clear();
        self.score = None;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.status {
            SessionStatus::InProgress => self.questions.get(self.position),
            _ => None,
        }
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Final score; `None` until finished.
    pub fn score(&self) -> Option<usize> {
        self.score
    }

    pub fn percentage(&self) -> Option<u8> {
        self.score.map(|score| percentage(score, self.total()))
    }

    pub fn review(&self) -> Vec<AnswerResult<'_>> {
        review(&self.questions, &self.answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryQuestionStore;
    use crate::error::FetchError;
    use crate::models::HistoryKind;
    use crate::session::fixtures;

    struct DownStore;

    impl QuestionStore for DownStore {
        fn fetch(&self, _query: &QuestionQuery) -> std::result::Result<Vec<Question>, FetchError> {
            Err(FetchError::Unavailable("offline".to_string()))
        }
    }

    fn started(correct: &[usize]) -> (QuizSession, HistoryStore) {
        let history = HistoryStore::in_memory();
        let mut session = QuizSession::new(Some("english".to_string()), history.clone());
        session.start(fixtures::questions("english", correct)).unwrap();
        (session, history)
    }

    #[test]
    fn test_three_question_scenario() {
        let (mut session, history) = started(&[0, 1, 2]);

        assert_eq!(session.answer(0).unwrap(), AnswerOutcome::Next { position: 1 });
        assert_eq!(session.answer(1).unwrap(), AnswerOutcome::Next { position: 2 });
        assert_eq!(
            session.answer(3).unwrap(),
            AnswerOutcome::Finished { score: 2, total: 3 }
        );

        assert!(session.is_finished());
        assert_eq!(session.score(), Some(2));
        assert_eq!(session.percentage(), Some(67));

        let saved = history.read_all(HistoryKind::Quiz);
        assert_eq!(saved.len(), 1);
        match &saved[0] {
            HistoryEntry::Quiz(record) => {
                assert_eq!(record.score, 2);
                assert_eq!(record.total, 3);
                assert_eq!(record.percentage, 67);
                assert_eq!(record.subject.as_deref(), Some("english"));
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_answer_after_finish_is_invalid() {
        let (mut session, history) = started(&[1]);
        session.answer(1).unwrap();

        let err = session.answer(0).unwrap_err();
        assert!(matches!(err, QuizError::InvalidState(_)));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(history.read_all(HistoryKind::Quiz).len(), 1);
    }

    #[test]
    fn test_answer_while_loading_or_unstarted_is_invalid() {
        let mut session = QuizSession::new(None, HistoryStore::in_memory());
        assert!(matches!(session.answer(0), Err(QuizError::InvalidState(_))));

        session.begin_loading();
        assert_eq!(session.status(), SessionStatus::Loading);
        assert!(matches!(session.answer(0), Err(QuizError::InvalidState(_))));
        assert!(session.current_question().is_none());
    }

    #[test]
    fn test_out_of_range_choice_is_invalid() {
        let (mut session, _) = started(&[0, 1]);
        assert!(matches!(session.answer(4), Err(QuizError::InvalidState(_))));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_start_rejects_empty_set() {
        let mut session = QuizSession::new(Some("urdu".to_string()), HistoryStore::in_memory());
        let err = session.start(Vec::new()).unwrap_err();
        assert!(err.is_empty_result());
        assert_eq!(session.status(), SessionStatus::NotStarted);
    }

    #[test]
    fn test_restart_keeps_questions() {
        let (mut session, history) = started(&[0, 0]);
        session.answer(0).unwrap();
        session.answer(1).unwrap();
        assert_eq!(session.score(), Some(1));

        session.restart().unwrap();
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.position(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.score(), None);
        assert_eq!(session.total(), 2);

        session.answer(0).unwrap();
        session.answer(0).unwrap();
        assert_eq!(session.score(), Some(2));
        assert_eq!(history.read_all(HistoryKind::Quiz).len(), 2);
    }

    #[test]
    fn test_fetch_distinguishes_empty_from_failure() {
        let store = MemoryQuestionStore::new(fixtures::questions("english", &[0]));

        let found = QuizSession::fetch(&store, Some("English")).unwrap();
        assert_eq!(found.len(), 1);

        let empty = QuizSession::fetch(&store, Some("math")).unwrap_err();
        assert!(empty.is_empty_result());
        assert_eq!(empty.to_string(), "No questions found for math");

        let down = QuizSession::fetch(&DownStore, None).unwrap_err();
        assert!(down.is_retryable());
    }

    #[test]
    fn test_review_after_finish() {
        let (mut session, _) = started(&[2, 3]);
        session.answer(2).unwrap();
        session.answer(0).unwrap();

        let lines = session.review();
        assert!(lines[0].is_correct);
        assert!(!lines[1].is_correct);
        assert_eq!(lines[1].chosen, Some(0));
        assert_eq!(lines[1].question.correct_option(), "english1-3");
    }
}
