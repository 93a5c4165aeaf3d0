use thiserror::Error;

use crate::model::{Difficulty, QuestionId};

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("expected {OPTION_COUNT} options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("correct answer index {index} is out of range")]
    AnswerOutOfRange { index: usize },
}

/// A multiple-choice trivia question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: u8,
    difficulty: Difficulty,
    explanation: String,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, the option count is not
    /// four, or the correct index does not point at an option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        difficulty: Difficulty,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let len = options.len();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| QuestionError::WrongOptionCount { len })?;

        let correct_index = u8::try_from(correct_index)
            .ok()
            .filter(|i| usize::from(*i) < OPTION_COUNT)
            .ok_or(QuestionError::AnswerOutOfRange {
                index: correct_index,
            })?;

        Ok(Self {
            id,
            text: text.trim().to_owned(),
            options,
            correct_index,
            difficulty,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> u8 {
        self.correct_index
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[usize::from(self.correct_index)]
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, option: u8) -> bool {
        option == self.correct_index
    }
}

/// Letter shown next to an option (`A`..`D`).
#[must_use]
pub fn option_letter(index: u8) -> char {
    match index {
        0 => 'A',
        1 => 'B',
        2 => 'C',
        _ => 'D',
    }
}
