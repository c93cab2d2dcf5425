//! Quiz and mock exam session state machines.
//!
//! ```text
//! NotStarted -> Loading -> InProgress -> Finished
//!                              ^            |
//!                              +-- restart -+
//! ```

mod mock;
mod quiz;
mod shuffle;
mod timer;

use crate::models::Question;

pub use mock::{assemble_exam, subject_breakdown, MockExamSession, SubjectWeight, TickOutcome};
pub use quiz::QuizSession;
pub use shuffle::{fisher_yates, OptionShuffler, ShuffledOptions};
pub use timer::{Countdown, Tick};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    /// Questions are being fetched; answers are rejected.
    Loading,
    InProgress,
    Finished,
}

/// What happened after recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Moved on to the question at `position`.
    Next { position: usize },
    /// That was the last question.
    Finished { score: usize, total: usize },
}

/// Review line for one question of a finished attempt.
#[derive(Debug, Clone)]
pub struct AnswerResult<'a> {
    pub question: &'a Question,
    /// `None` when the attempt ended before this question was answered.
    pub chosen: Option<usize>,
    pub is_correct: bool,
}

/// Number of positions where the recorded answer equals the correct index.
pub fn score_answers(questions: &[Question], answers: &[usize]) -> usize {
    answers
        .iter()
        .zip(questions.iter())
        .filter(|(answer, question)| question.is_correct(**answer))
        .count()
}

pub(crate) fn review<'a>(questions: &'a [Question], answers: &[usize]) -> Vec<AnswerResult<'a>> {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let chosen = answers.get(i).copied();
            AnswerResult {
                question,
                chosen,
                is_correct: chosen.is_some_and(|c| question.is_correct(c)),
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::Question;

    pub fn question(id: &str, subject: &str, correct_index: usize) -> Question {
        Question {
            id: id.to_string(),
            subject: subject.to_string(),
            text: format!("{} question {}", subject, id),
            options: [
                format!("{}-0", id),
                format!("{}-1", id),
                format!("{}-2", id),
                format!("{}-3", id),
            ],
            correct_index,
            explanation: Some(format!("because {}", correct_index)),
        }
    }

    pub fn questions(subject: &str, correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, c)| question(&format!("{}{}", subject, i), subject, *c))
            .collect()
    }
}
