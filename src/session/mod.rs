//! Quiz session state machine.
//!
//! A session walks one fixed question set through attempts. Each attempt
//! starts `InProgress` at the first question and ends `Graded` when
//! submitted; [`QuizSession::reset`] starts the next attempt on the same
//! questions.
//!
//! Every successful operation publishes a fresh [`QuizSnapshot`]. Rejected
//! operations leave the current snapshot untouched.

mod snapshot;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{QuestionError, QuizQuestion};

pub use snapshot::{classify_option, OptionMark, Phase, QuizSnapshot, Verdict};

/// Operations that can be rejected by a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SelectAnswer,
    GoNext,
    GoPrevious,
    Submit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SelectAnswer => "select answer",
            Operation::GoNext => "next",
            Operation::GoPrevious => "previous",
            Operation::Submit => "submit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("\"{option}\" is not an option of question {index}")]
    InvalidOption { index: usize, option: String },

    #[error("cannot {operation}: {reason}")]
    PreconditionNotMet {
        operation: Operation,
        reason: &'static str,
    },

    #[error("a quiz needs at least one question")]
    EmptyQuiz,

    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

impl SessionError {
    fn precondition(operation: Operation, reason: &'static str) -> Self {
        SessionError::PreconditionNotMet { operation, reason }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// One user's run through a fixed set of quiz questions.
pub struct QuizSession {
    id: Uuid,
    questions: Arc<[QuizQuestion]>,
    current: Arc<QuizSnapshot>,
}

impl QuizSession {
    /// Start a session. Every question must satisfy its invariants.
    pub fn new(questions: Vec<QuizQuestion>) -> SessionResult<Self> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }
        for (index, question) in questions.iter().enumerate() {
            question
                .validate()
                .map_err(|source| SessionError::InvalidQuestion { index, source })?;
        }

        let questions: Arc<[QuizQuestion]> = questions.into();
        let id = Uuid::new_v4();
        debug!(session = %id, questions = questions.len(), "quiz session started");

        Ok(Self {
            id,
            current: Arc::new(QuizSnapshot::initial(Arc::clone(&questions), 1, 0)),
            questions,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Arc<QuizSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Record `option` as the answer to question `index`, replacing any
    /// earlier choice.
    pub fn select_answer(&mut self, index: usize, option: &str) -> SessionResult<()> {
        if self.current.is_submitted() {
            return Err(SessionError::precondition(
                Operation::SelectAnswer,
                "the attempt has already been submitted",
            ));
        }
        let valid = self
            .questions
            .get(index)
            .is_some_and(|question| question.has_option(option));
        if !valid {
            return Err(SessionError::InvalidOption {
                index,
                option: option.to_string(),
            });
        }

        self.publish(|next| {
            next.selected.insert(index, option.to_string());
        });
        Ok(())
    }

    /// Advance to the next question. The current one must be answered.
    pub fn go_next(&mut self) -> SessionResult<()> {
        let Phase::InProgress { current_index } = self.current.phase() else {
            return Err(SessionError::precondition(
                Operation::GoNext,
                "the attempt has already been submitted",
            ));
        };
        if current_index >= self.current.last_index() {
            return Err(SessionError::precondition(
                Operation::GoNext,
                "already at the last question",
            ));
        }
        if !self.current.is_answered(current_index) {
            return Err(SessionError::precondition(
                Operation::GoNext,
                "the current question has no answer",
            ));
        }

        self.publish(|next| {
            next.phase = Phase::InProgress {
                current_index: current_index + 1,
            };
        });
        Ok(())
    }

    pub fn go_previous(&mut self) -> SessionResult<()> {
        let Phase::InProgress { current_index } = self.current.phase() else {
            return Err(SessionError::precondition(
                Operation::GoPrevious,
                "the attempt has already been submitted",
            ));
        };
        if current_index == 0 {
            return Err(SessionError::precondition(
                Operation::GoPrevious,
                "already at the first question",
            ));
        }

        self.publish(|next| {
            next.phase = Phase::InProgress {
                current_index: current_index - 1,
            };
        });
        Ok(())
    }

    /// Grade the attempt. The score is computed here and nowhere else.
    pub fn submit(&mut self) -> SessionResult<()> {
        if self.current.is_submitted() {
            return Err(SessionError::precondition(
                Operation::Submit,
                "the attempt has already been submitted",
            ));
        }
        if !self.current.can_submit() {
            return Err(SessionError::precondition(
                Operation::Submit,
                "every question needs an answer",
            ));
        }

        let score = self.current.count_correct();
        self.publish(|next| {
            next.phase = Phase::Graded { score };
        });
        debug!(
            session = %self.id,
            attempt = self.current.attempt(),
            score,
            total = self.questions.len(),
            "attempt graded"
        );
        Ok(())
    }

    /// Discard the attempt and start a new one at the first question.
    pub fn reset(&mut self) {
        let attempt = self.current.attempt() + 1;
        let revision = self.current.revision() + 1;
        self.current = Arc::new(QuizSnapshot::initial(
            Arc::clone(&self.questions),
            attempt,
            revision,
        ));
        debug!(session = %self.id, attempt, "attempt reset");
    }

    fn publish(&mut self, apply: impl FnOnce(&mut QuizSnapshot)) {
        let mut next = QuizSnapshot::clone(&self.current);
        apply(&mut next);
        next.revision += 1;
        self.current = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::new(
                "Capital of France?",
                ["Paris", "Rome", "Berlin", "Madrid"],
                "Paris",
                "Paris is the capital of France.",
            ),
            QuizQuestion::new(
                "Answer to everything?",
                ["41", "42", "43", "44"],
                "42",
                "According to Douglas Adams.",
            ),
            QuizQuestion::new(
                "Oxygen gas?",
                ["O2", "H2O", "CO2", "N2"],
                "O2",
                "Two oxygen atoms.",
            ),
        ]
    }

    fn session() -> QuizSession {
        QuizSession::new(three_questions()).unwrap()
    }

    fn answer_all(session: &mut QuizSession, answers: [&str; 3]) {
        for (i, answer) in answers.iter().enumerate() {
            session.select_answer(i, answer).unwrap();
            if i < 2 {
                session.go_next().unwrap();
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let s = session().snapshot();
        assert_eq!(s.phase(), Phase::InProgress { current_index: 0 });
        assert_eq!(s.current_index(), 0);
        assert!(!s.is_submitted());
        assert!(s.selected_answers().is_empty());
        assert_eq!(s.score(), None);
        assert_eq!(s.attempt(), 1);
    }

    #[test]
    fn test_rejects_empty_quiz() {
        assert!(matches!(QuizSession::new(vec![]), Err(SessionError::EmptyQuiz)));
    }

    #[test]
    fn test_rejects_invalid_question() {
        let mut questions = three_questions();
        questions[1].correct_answer = "forty-two".to_string();
        let err = QuizSession::new(questions).err().unwrap();
        assert!(matches!(
            err,
            SessionError::InvalidQuestion {
                index: 1,
                source: QuestionError::UnknownCorrectAnswer(_)
            }
        ));
    }

    #[test]
    fn test_select_answer_is_readable() {
        let mut session = session();
        session.select_answer(2, "CO2").unwrap();
        assert_eq!(session.snapshot().selected_answer(2), Some("CO2"));

        session.select_answer(2, "O2").unwrap();
        assert_eq!(session.snapshot().selected_answer(2), Some("O2"));
    }

    #[test]
    fn test_select_unknown_option() {
        let mut session = session();
        let err = session.select_answer(0, "London").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidOption {
                index: 0,
                option: "London".to_string()
            }
        );
        assert!(session.snapshot().selected_answers().is_empty());
    }

    #[test]
    fn test_select_out_of_range_index() {
        let mut session = session();
        assert!(matches!(
            session.select_answer(3, "Paris"),
            Err(SessionError::InvalidOption { index: 3, .. })
        ));
    }

    #[test]
    fn test_next_requires_answer() {
        let mut session = session();
        let before = session.snapshot();
        let err = session.go_next().unwrap_err();
        assert!(matches!(
            err,
            SessionError::PreconditionNotMet {
                operation: Operation::GoNext,
                ..
            }
        ));
        assert_eq!(session.snapshot().current_index(), 0);
        assert_eq!(session.snapshot().revision(), before.revision());

        session.select_answer(0, "Rome").unwrap();
        session.go_next().unwrap();
        assert_eq!(session.snapshot().current_index(), 1);
    }

    #[test]
    fn test_next_stops_at_last_question() {
        let mut session = session();
        answer_all(&mut session, ["Paris", "42", "O2"]);
        assert_eq!(session.snapshot().current_index(), 2);
        assert!(session.go_next().is_err());
        assert_eq!(session.snapshot().current_index(), 2);
    }

    #[test]
    fn test_previous_keeps_answers() {
        let mut session = session();
        assert!(session.go_previous().is_err());

        session.select_answer(0, "Paris").unwrap();
        session.go_next().unwrap();
        session.go_previous().unwrap();

        let s = session.snapshot();
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.selected_answer(0), Some("Paris"));
    }

    #[test]
    fn test_progress_fraction_follows_navigation() {
        let mut session = session();
        assert!((session.snapshot().progress_fraction() - 1.0 / 3.0).abs() < f64::EPSILON);

        session.select_answer(0, "Paris").unwrap();
        session.go_next().unwrap();
        assert!((session.snapshot().progress_fraction() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_submit_rejected_with_gap_at_last_index() {
        let mut session = session();
        session.select_answer(0, "Paris").unwrap();
        session.go_next().unwrap();
        session.select_answer(1, "42").unwrap();
        session.go_next().unwrap();

        let err = session.submit().unwrap_err();
        assert!(matches!(
            err,
            SessionError::PreconditionNotMet {
                operation: Operation::Submit,
                ..
            }
        ));
        assert!(!session.snapshot().is_submitted());
    }

    #[test]
    fn test_submit_requires_every_answer() {
        let mut session = session();
        session.select_answer(2, "O2").unwrap();
        assert!(!session.snapshot().can_submit());
        assert!(session.submit().is_err());
    }

    #[test]
    fn test_scenario_mixed_answers() {
        let mut session = session();
        answer_all(&mut session, ["Paris", "41", "O2"]);
        session.submit().unwrap();

        let s = session.snapshot();
        assert!(s.is_submitted());
        assert_eq!(s.score(), Some(2));
        assert!(s.is_correct(0));
        assert!(!s.is_correct(1));

        let marks = s.option_marks(1).unwrap();
        let question = &s.questions()[1];
        let mark_of = |option: &str| marks[question.option_position(option).unwrap()];
        assert_eq!(mark_of("42"), OptionMark::Correct);
        assert_eq!(mark_of("41"), OptionMark::IncorrectSelected);
        assert_eq!(mark_of("43"), OptionMark::Neutral);
        assert_eq!(s.option_marks(1), Some(marks.clone()));
        assert_eq!(s.verdict(), Some(Verdict::NeedsReview));
    }

    #[test]
    fn test_scenario_single_question() {
        let question = QuizQuestion::new("Pick b", ["a", "b", "c", "d"], "b", "");

        let mut right = QuizSession::new(vec![question.clone()]).unwrap();
        assert!(right.go_next().is_err());
        assert_eq!(right.snapshot().current_index(), 0);
        right.select_answer(0, "b").unwrap();
        right.submit().unwrap();
        assert_eq!(right.snapshot().score(), Some(1));
        assert_eq!(right.snapshot().verdict(), Some(Verdict::GreatJob));

        let mut wrong = QuizSession::new(vec![question]).unwrap();
        wrong.select_answer(0, "c").unwrap();
        wrong.submit().unwrap();
        assert_eq!(wrong.snapshot().score(), Some(0));
    }

    #[test]
    fn test_scenario_submit_is_single_shot() {
        let mut session = session();
        answer_all(&mut session, ["Paris", "41", "O2"]);
        session.submit().unwrap();

        assert!(matches!(
            session.select_answer(1, "42"),
            Err(SessionError::PreconditionNotMet {
                operation: Operation::SelectAnswer,
                ..
            })
        ));
        assert!(session.submit().is_err());

        let s = session.snapshot();
        assert_eq!(s.score(), Some(2));
        assert_eq!(s.selected_answer(1), Some("41"));
    }

    #[test]
    fn test_navigation_rejected_after_submit() {
        let mut session = session();
        answer_all(&mut session, ["Paris", "42", "O2"]);
        session.submit().unwrap();
        assert!(session.go_previous().is_err());
        assert!(session.go_next().is_err());
        assert!(!session.snapshot().can_go_previous());
    }

    #[test]
    fn test_option_marks_only_when_graded() {
        let mut session = session();
        session.select_answer(0, "Rome").unwrap();
        assert_eq!(session.snapshot().option_marks(0), None);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = session();
        let id = session.id();
        answer_all(&mut session, ["Paris", "42", "O2"]);
        session.submit().unwrap();
        assert_eq!(session.snapshot().score(), Some(3));

        session.reset();
        let s = session.snapshot();
        assert_eq!(s.phase(), Phase::InProgress { current_index: 0 });
        assert!(s.selected_answers().is_empty());
        assert!(!s.is_submitted());
        assert_eq!(s.score(), None);
        assert_eq!(s.attempt(), 2);
        assert_eq!(session.id(), id);
    }

    #[test]
    fn test_reset_mid_attempt() {
        let mut session = session();
        session.select_answer(0, "Paris").unwrap();
        session.go_next().unwrap();
        session.reset();
        assert_eq!(session.snapshot().current_index(), 0);
        assert!(!session.snapshot().is_answered(0));
    }

    #[test]
    fn test_old_snapshots_are_not_mutated() {
        let mut session = session();
        let initial = session.snapshot();

        session.select_answer(0, "Paris").unwrap();
        session.go_next().unwrap();
        let middle = session.snapshot();

        session.reset();

        assert!(initial.selected_answers().is_empty());
        assert_eq!(initial.current_index(), 0);
        assert_eq!(middle.selected_answer(0), Some("Paris"));
        assert_eq!(middle.current_index(), 1);
        assert!(initial.revision() < middle.revision());
        assert!(middle.revision() < session.snapshot().revision());
    }

    #[test]
    fn test_error_messages() {
        let err = SessionError::precondition(Operation::GoNext, "the current question has no answer");
        assert_eq!(err.to_string(), "cannot next: the current question has no answer");
    }
}
