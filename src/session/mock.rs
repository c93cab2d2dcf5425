//! Timed, subject-weighted mock exam.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::{QuestionQuery, QuestionStore};
use crate::error::{QuizError, Result};
use crate::history::HistoryStore;
use crate::models::{percentage, Breakdown, HistoryEntry, MockExamRecord, Question, NUM_OPTIONS};

use super::shuffle::fisher_yates;
use super::timer::Countdown;
use super::{review, score_answers, AnswerOutcome, AnswerResult, SessionStatus};

/// Target number of questions drawn from one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectWeight {
    pub subject: String,
    pub count: usize,
}

impl SubjectWeight {
    pub fn new(subject: impl Into<String>, count: usize) -> Self {
        Self {
            subject: subject.into(),
            count,
        }
    }
}

/// Builds an exam: per subject, shuffle everything the store has and keep the
/// first `count`; then shuffle the combined set so order hides grouping.
///
/// A subject that fails to fetch or has no questions is skipped. If nothing
/// at all could be drawn the result is an error: [`QuizError::Fetch`] when
/// every subject failed to fetch, otherwise [`QuizError::EmptyResult`].
pub fn assemble_exam<R: Rng + ?Sized>(
    store: &dyn QuestionStore,
    weights: &[SubjectWeight],
    rng: &mut R,
) -> Result<Vec<Question>> {
    let mut exam = Vec::new();
    let mut last_error = None;
    let mut failures = 0;

    for weight in weights {
        let mut available = match store.fetch(&QuestionQuery::subject(&weight.subject)) {
            Ok(questions) => questions,
            Err(e) => {
                warn!(subject = %weight.subject, error = %e, "skipping subject, fetch failed");
                failures += 1;
                last_error = Some(e);
                continue;
            }
        };
        if available.is_empty() {
            warn!(subject = %weight.subject, "skipping subject, no questions");
            continue;
        }

        fisher_yates(&mut available, rng);
        available.truncate(weight.count);
        info!(
            subject = %weight.subject,
            wanted = weight.count,
            drawn = available.len(),
            "sampled subject"
        );
        exam.extend(available);
    }

    if exam.is_empty() {
        return match last_error {
            Some(e) if failures == weights.len() => Err(e.into()),
            _ => Err(QuizError::EmptyResult { subject: None }),
        };
    }

    fisher_yates(&mut exam, rng);
    Ok(exam)
}

/// Per-subject tally over every question; unanswered questions count toward
/// `total` only.
pub fn subject_breakdown(questions: &[Question], answers: &[usize]) -> Breakdown {
    let mut breakdown = Breakdown::new();
    for (i, question) in questions.iter().enumerate() {
        let tally = breakdown.entry(question.subject.clone()).or_default();
        tally.total += 1;
        if answers.get(i).is_some_and(|a| question.is_correct(*a)) {
            tally.correct += 1;
        }
    }
    breakdown
}

/// Result of delivering one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not running; the tick was dropped.
    Ignored,
    Running { remaining_secs: u64 },
    /// Time ran out and the exam was finished.
    Expired,
}

pub struct MockExamSession {
    questions: Vec<Question>,
    position: usize,
    answers: Vec<usize>,
    status: SessionStatus,
    duration_secs: u64,
    remaining_secs: u64,
    score: Option<usize>,
    breakdown: Breakdown,
    countdown: Option<Countdown>,
    history: HistoryStore,
}

impl MockExamSession {
    pub fn new(duration_secs: u64, history: HistoryStore) -> Self {
        Self {
            questions: Vec::new(),
            position: 0,
            answers: Vec::new(),
            status: SessionStatus::NotStarted,
            duration_secs,
            remaining_secs: duration_secs,
            score: None,
            breakdown: Breakdown::new(),
            countdown: None,
            history,
        }
    }

    pub fn begin_loading(&mut self) {
        self.countdown = None;
        self.status = SessionStatus::Loading;
    }

    pub fn abort_loading(&mut self) {
        self.questions.clear();
        self.reset_progress();
        self.status = SessionStatus::NotStarted;
    }

    /// Enters `InProgress` with a full clock. Valid from any state but
    /// `InProgress`, so it also serves as restart with a new question set.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<()> {
        if self.status == SessionStatus::InProgress {
            return Err(QuizError::InvalidState("exam already in progress"));
        }
        if questions.is_empty() {
            return Err(QuizError::EmptyResult { subject: None });
        }
        self.questions = questions;
        self.reset_progress();
        self.status = SessionStatus::InProgress;
        info!(
            count = self.questions.len(),
            duration_secs = self.duration_secs,
            "mock exam started"
        );
        Ok(())
    }

    /// Hands the session its tick source. Dropped on finish or with the
    /// session; attaching to a session that is not running drops it at once.
    pub fn attach_countdown(&mut self, countdown: Countdown) {
        if self.status == SessionStatus::InProgress {
            self.countdown = Some(countdown);
        }
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn answer(&mut self, choice: usize) -> Result<AnswerOutcome> {
        match self.status {
            SessionStatus::InProgress => {}
            SessionStatus::Finished => return Err(QuizError::InvalidState("exam already finished")),
            SessionStatus::Loading => return Err(QuizError::InvalidState("exam still loading")),
            SessionStatus::NotStarted => return Err(QuizError::InvalidState("exam not started")),
        }
        if choice >= NUM_OPTIONS {
            return Err(QuizError::InvalidState("option index out of range"));
        }
        if self.answers.len() >= self.questions.len() {
            return Err(QuizError::InvalidState("no question left to answer"));
        }

        self.answers.push(choice);

        if self.position + 1 >= self.questions.len() {
            self.finish_now();
            Ok(AnswerOutcome::Finished {
                score: self.score.unwrap_or(0),
                total: self.questions.len(),
            })
        } else {
            self.position += 1;
            Ok(AnswerOutcome::Next {
                position: self.position,
            })
        }
    }

    /// Stops the exam. Returns `Ok(false)` without touching anything when it
    /// had already finished.
    pub fn finish(&mut self) -> Result<bool> {
        match self.status {
            SessionStatus::InProgress => {
                self.finish_now();
                Ok(true)
            }
            SessionStatus::Finished => Ok(false),
            _ => Err(QuizError::InvalidState("exam not started")),
        }
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::InProgress {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            info!("mock exam time expired");
            self.finish_now();
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    fn finish_now(&mut self) {
        self.countdown = None;
        self.status = SessionStatus::Finished;

        let score = score_answers(&self.questions, &self.answers);
        self.score = Some(score);
        self.breakdown = subject_breakdown(&self.questions, &self.answers);

        info!(
            score,
            total = self.questions.len(),
            elapsed_secs = self.elapsed_secs(),
            "mock exam finished"
        );
        self.history.append(HistoryEntry::Mock(MockExamRecord {
            score,
            total: self.questions.len(),
            timestamp: Utc::now(),
            elapsed_secs: self.elapsed_secs(),
            breakdown: self.breakdown.clone(),
        }));
    }

    fn reset_progress(&mut self) {
        self.position = 0;
        self.answers.clear();
        self.score = None;
        self.breakdown.clear();
        self.remaining_secs = self.duration_secs;
        self.countdown = None;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
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

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.duration_secs - self.remaining_secs
    }

    pub fn score(&self) -> Option<usize> {
        self.score
    }

    pub fn percentage(&self) -> Option<u8> {
        self.score.map(|score| percentage(score, self.total()))
    }

    /// Empty until finished.
    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
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
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::mpsc;

    struct PartlyDown {
        inner: MemoryQuestionStore,
        down: &'static str,
    }

    impl QuestionStore for PartlyDown {
        fn fetch(&self, query: &QuestionQuery) -> std::result::Result<Vec<Question>, FetchError> {
            if query.subject.as_deref() == Some(self.down) {
                return Err(FetchError::Unavailable("timeout".to_string()));
            }
            self.inner.fetch(query)
        }
    }

    fn bank() -> MemoryQuestionStore {
        let mut questions = fixtures::questions("english", &[0, 1, 2, 3, 0, 1]);
        questions.extend(fixtures::questions("urdu", &[2, 2, 2]));
        MemoryQuestionStore::new(questions)
    }

    fn running(questions: Vec<Question>) -> (MockExamSession, HistoryStore) {
        let history = HistoryStore::in_memory();
        let mut session = MockExamSession::new(1800, history.clone());
        session.start(questions).unwrap();
        (session, history)
    }

    #[test]
    fn test_assemble_respects_weights() {
        let weights = [SubjectWeight::new("english", 4), SubjectWeight::new("urdu", 10)];
        let exam = assemble_exam(&bank(), &weights, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(exam.len(), 7);
        assert_eq!(exam.iter().filter(|q| q.subject == "english").count(), 4);
        assert_eq!(exam.iter().filter(|q| q.subject == "urdu").count(), 3);

        let mut ids: Vec<_> = exam.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_assemble_skips_empty_subject() {
        let weights = [SubjectWeight::new("english", 2), SubjectWeight::new("math", 1)];
        let exam = assemble_exam(&bank(), &weights, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(exam.len(), 2);
        assert!(exam.iter().all(|q| q.subject == "english"));

        let (mut session, _) = running(exam);
        session.finish().unwrap();
        let subjects: Vec<_> = session.breakdown().keys().cloned().collect();
        assert_eq!(subjects, ["english"]);
    }

    #[test]
    fn test_assemble_skips_failing_subject() {
        let store = PartlyDown {
            inner: bank(),
            down: "english",
        };
        let weights = [SubjectWeight::new("english", 2), SubjectWeight::new("urdu", 2)];
        let exam = assemble_exam(&store, &weights, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(exam.len(), 2);
        assert!(exam.iter().all(|q| q.subject == "urdu"));
    }

    #[test]
    fn test_assemble_with_nothing_drawn() {
        let weights = [SubjectWeight::new("math", 5)];
        let err = assemble_exam(&bank(), &weights, &mut StdRng::seed_from_u64(4)).unwrap_err();
        assert!(err.is_empty_result());

        let store = PartlyDown {
            inner: bank(),
            down: "english",
        };
        let weights = [SubjectWeight::new("english", 5)];
        let err = assemble_exam(&store, &weights, &mut StdRng::seed_from_u64(4)).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_assemble_is_deterministic_for_seed() {
        let weights = [SubjectWeight::new("english", 3), SubjectWeight::new("urdu", 2)];
        let a = assemble_exam(&bank(), &weights, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = assemble_exam(&bank(), &weights, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_breakdown_sums_match_score_and_total() {
        let mut questions = fixtures::questions("english", &[0, 1, 2]);
        questions.extend(fixtures::questions("math", &[3, 3]));
        let (mut session, history) = running(questions);

        for choice in [0, 0, 2, 3, 1] {
            session.answer(choice).unwrap();
        }
        assert!(session.is_finished());
        assert_eq!(session.score(), Some(3));

        let breakdown = session.breakdown();
        let total: usize = breakdown.values().map(|t| t.total).sum();
        let correct: usize = breakdown.values().map(|t| t.correct).sum();
        assert_eq!(total, session.total());
        assert_eq!(correct, 3);
        assert_eq!(breakdown["english"].correct, 2);
        assert_eq!(breakdown["math"].correct, 1);

        let saved = history.read_all(HistoryKind::Mock);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].score(), 3);
    }

    #[test]
    fn test_manual_finish_counts_unanswered_as_wrong() {
        let (mut session, _) = running(fixtures::questions("english", &[0, 1, 2, 3]));
        session.answer(0).unwrap();
        assert!(session.finish().unwrap());

        assert_eq!(session.score(), Some(1));
        assert_eq!(session.breakdown()["english"].total, 4);
        assert_eq!(session.breakdown()["english"].correct, 1);
    }

    #[test]
    fn test_finish_twice_is_noop() {
        let (mut session, history) = running(fixtures::questions("english", &[0, 1]));
        session.answer(0).unwrap();
        assert!(session.finish().unwrap());
        let score = session.score();

        assert!(!session.finish().unwrap());
        assert_eq!(session.score(), score);
        assert_eq!(history.read_all(HistoryKind::Mock).len(), 1);
    }

    #[test]
    fn test_finish_before_start_is_invalid() {
        let mut session = MockExamSession::new(60, HistoryStore::in_memory());
        assert!(matches!(session.finish(), Err(QuizError::InvalidState(_))));
    }

    #[test]
    fn test_timeout_auto_finishes() {
        let history = HistoryStore::in_memory();
        let mut session = MockExamSession::new(3, history.clone());
        session.start(fixtures::questions("urdu", &[2, 2])).unwrap();
        session.answer(2).unwrap();

        assert_eq!(session.tick(), TickOutcome::Running { remaining_secs: 2 });
        assert_eq!(session.tick(), TickOutcome::Running { remaining_secs: 1 });
        assert_eq!(session.tick(), TickOutcome::Expired);

        assert!(session.is_finished());
        assert_eq!(session.elapsed_secs(), 3);
        assert_eq!(session.score(), Some(1));

        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(history.read_all(HistoryKind::Mock).len(), 1);

        match &history.read_all(HistoryKind::Mock)[0] {
            HistoryEntry::Mock(record) => assert_eq!(record.time_spent(), "00:03"),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_answer_rejected_while_loading() {
        let mut session = MockExamSession::new(60, HistoryStore::in_memory());
        session.begin_loading();
        assert!(matches!(session.answer(0), Err(QuizError::InvalidState(_))));
        assert_eq!(session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_restart_with_new_questions() {
        let (mut session, _) = running(fixtures::questions("english", &[0]));
        session.answer(0).unwrap();
        session.tick();

        session.start(fixtures::questions("urdu", &[1, 1])).unwrap();
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.total(), 2);
        assert_eq!(session.remaining_secs(), 1800);
        assert!(session.breakdown().is_empty());
        assert!(session.answers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_released_on_finish() {
        let (tx, mut rx) = mpsc::unbounded_channel::<crate::session::Tick>();
        let (mut session, _) = running(fixtures::questions("english", &[0, 1]));
        session.attach_countdown(Countdown::every_second(tx));
        assert!(session.has_countdown());

        rx.recv().await.unwrap();
        session.tick();

        session.finish().unwrap();
        assert!(!session.has_countdown());
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_released_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<crate::session::Tick>();
        let (mut session, _) = running(fixtures::questions("english", &[0]));
        session.attach_countdown(Countdown::every_second(tx));

        drop(session);
        assert_eq!(rx.recv().await, None);
    }
}
