use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every generated question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A multiple-choice question as produced by the quiz generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// Ways a question can break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyQuestion,

    #[error("option \"{0}\" appears more than once")]
    DuplicateOption(String),

    #[error("correct answer \"{0}\" is not one of the options")]
    UnknownCorrectAnswer(String),
}

impl QuizQuestion {
    pub fn new(
        question: impl Into<String>,
        options: [&str; OPTIONS_PER_QUESTION],
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options: options.map(str::to_string),
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
        }
    }

    /// Check the question text, option uniqueness and the correct answer.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }

        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }

        if !self.has_option(&self.correct_answer) {
            return Err(QuestionError::UnknownCorrectAnswer(
                self.correct_answer.clone(),
            ));
        }

        Ok(())
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Position of `option` in the option list.
    pub fn option_position(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}
