use serde::{Deserialize, Serialize};

/// Every question carries exactly this many options.
pub const NUM_OPTIONS: usize = 4;

pub const OPTION_LABELS: [char; NUM_OPTIONS] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub subject: String,
    pub text: String,
    pub options: [String; NUM_OPTIONS],
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }

    pub fn correct_option(&self) -> &str {
        self.option(self.correct_index).unwrap_or_default()
    }

    /// Option text for a true (unshuffled) index.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}
