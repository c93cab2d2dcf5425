mod loader;

pub use loader::{
    load_questions_from_json, subject_matches, JsonQuestionStore, MemoryQuestionStore,
    QuestionQuery, QuestionStore,
};
