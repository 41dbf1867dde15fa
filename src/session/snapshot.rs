//! Immutable views of a quiz session.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::QuizQuestion;

/// Share of correct answers above which an attempt counts as a success.
const GREAT_JOB_THRESHOLD: f64 = 0.7;

/// Where an attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Answering, one question at a time.
    InProgress { current_index: usize },
    /// Submitted. The score was computed once at submission.
    Graded { score: usize },
}

/// How an option is shown once the attempt is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    IncorrectSelected,
    Neutral,
}

/// Overall feedback for a graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    GreatJob,
    NeedsReview,
}

impl Verdict {
    pub fn message(self) -> &'static str {
        match self {
            Verdict::GreatJob => "Great job!",
            Verdict::NeedsReview => "Review the answers below to improve.",
        }
    }
}

/// Classify one option of a graded question.
pub fn classify_option(question: &QuizQuestion, selected: Option<&str>, option: &str) -> OptionMark {
    if question.is_correct(option) {
        OptionMark::Correct
    } else if selected == Some(option) {
        OptionMark::IncorrectSelected
    } else {
        OptionMark::Neutral
    }
}

/// The state of a session after one transition.
///
/// Snapshots are never modified once published; the session replaces its
/// current snapshot instead.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    pub(super) questions: Arc<[QuizQuestion]>,
    pub(super) selected: BTreeMap<usize, String>,
    pub(super) phase: Phase,
    pub(super) attempt: u32,
    pub(super) revision: u64,
}

impl QuizSnapshot {
    pub(super) fn initial(questions: Arc<[QuizQuestion]>, attempt: u32, revision: u64) -> Self {
        Self {
            questions,
            selected: BTreeMap::new(),
            phase: Phase::InProgress { current_index: 0 },
            attempt,
            revision,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Bumped on every published transition.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question on screen. Graded attempts report the last index.
    pub fn current_index(&self) -> usize {
        match self.phase {
            Phase::InProgress { current_index } => current_index,
            Phase::Graded { .. } => self.last_index(),
        }
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current_index()]
    }

    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, Phase::Graded { .. })
    }

    pub fn score(&self) -> Option<usize> {
        match self.phase {
            Phase::Graded { score } => Some(score),
            Phase::InProgress { .. } => None,
        }
    }

    pub fn selected_answer(&self, index: usize) -> Option<&str> {
        self.selected.get(&index).map(String::as_str)
    }

    pub fn selected_answers(&self) -> &BTreeMap<usize, String> {
        &self.selected
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.selected.contains_key(&index)
    }

    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    /// `(current_index + 1) / N`, for display only.
    pub fn progress_fraction(&self) -> f64 {
        (self.current_index() + 1) as f64 / self.questions.len() as f64
    }

    pub fn can_go_next(&self) -> bool {
        match self.phase {
            Phase::InProgress { current_index } => {
                current_index < self.last_index() && self.is_answered(current_index)
            }
            Phase::Graded { .. } => false,
        }
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.phase, Phase::InProgress { current_index } if current_index > 0)
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitted() && (0..self.questions.len()).all(|i| self.is_answered(i))
    }

    /// Number of selections matching the correct answer right now.
    pub(super) fn count_correct(&self) -> usize {
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, question)| {
                self.selected_answer(*i)
                    .is_some_and(|answer| question.is_correct(answer))
            })
            .count()
    }

    pub fn is_correct(&self, index: usize) -> bool {
        match (self.questions.get(index), self.selected_answer(index)) {
            (Some(question), Some(answer)) => question.is_correct(answer),
            _ => false,
        }
    }

    /// Marks for each option of question `index`, in option order.
    ///
    /// Only graded attempts are classified; otherwise `None`.
    pub fn option_marks(&self, index: usize) -> Option<Vec<OptionMark>> {
        if !self.is_submitted() {
            return None;
        }
        let question = self.questions.get(index)?;
        let selected = self.selected_answer(index);
        Some(
            question
                .options
                .iter()
                .map(|option| classify_option(question, selected, option))
                .collect(),
        )
    }

    pub fn verdict(&self) -> Option<Verdict> {
        let score = self.score()?;
        let ratio = score as f64 / self.questions.len() as f64;
        Some(if ratio > GREAT_JOB_THRESHOLD {
            Verdict::GreatJob
        } else {
            Verdict::NeedsReview
        })
    }

    /// Score as a percentage of the question count.
    pub fn percentage(&self) -> Option<f64> {
        self.score()
            .map(|score| score as f64 / self.questions.len() as f64 * 100.0)
    }
}
