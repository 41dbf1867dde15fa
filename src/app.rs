use std::cell::Cell;
use std::sync::Arc;

use tracing::debug;

use crate::models::{QuizQuestion, OPTIONS_PER_QUESTION};
use crate::session::{QuizSession, QuizSnapshot, SessionError, SessionResult};

/// Terminal front end state around one quiz session.
pub struct App {
    session: QuizSession,
    title: String,
    highlighted: usize,
    result_scroll: usize,
    result_scroll_limit: Cell<usize>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: QuizSession, title: impl Into<String>) -> Self {
        Self {
            session,
            title: title.into(),
            highlighted: 0,
            result_scroll: 0,
            result_scroll_limit: Cell::new(0),
            should_quit: false,
        }
    }

    /// Build the session from `questions` and wrap it.
    pub fn with_questions(questions: Vec<QuizQuestion>, title: impl Into<String>) -> SessionResult<Self> {
        Ok(Self::new(QuizSession::new(questions)?, title))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snapshot(&self) -> Arc<QuizSnapshot> {
        self.session.snapshot()
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Option under the cursor on the current question.
    pub fn highlighted_option(&self) -> usize {
        self.highlighted
    }

    /// Scroll offset of the graded breakdown, never past the last line.
    pub fn result_scroll(&self) -> usize {
        self.result_scroll.min(self.result_scroll_limit.get())
    }

    /// Set by the graded view each frame from the wrapped breakdown height.
    pub fn set_result_scroll_limit(&self, limit: usize) {
        self.result_scroll_limit.set(limit);
    }

    pub fn highlight_next_option(&mut self) {
        self.highlighted = (self.highlighted + 1) % OPTIONS_PER_QUESTION;
    }

    pub fn highlight_previous_option(&mut self) {
        self.highlighted = (self.highlighted + OPTIONS_PER_QUESTION - 1) % OPTIONS_PER_QUESTION;
    }

    /// Answer the current question with the highlighted option.
    pub fn choose_highlighted(&mut self) {
        let snapshot = self.session.snapshot();
        let index = snapshot.current_index();
        let option = &snapshot.current_question().options[self.highlighted];
        let outcome = self.session.select_answer(index, option);
        ignore_guard(outcome);
    }

    pub fn next_question(&mut self) {
        let outcome = self.session.go_next();
        if outcome.is_ok() {
            self.sync_highlight();
        }
        ignore_guard(outcome);
    }

    pub fn previous_question(&mut self) {
        let outcome = self.session.go_previous();
        if outcome.is_ok() {
            self.sync_highlight();
        }
        ignore_guard(outcome);
    }

    pub fn submit(&mut self) {
        let outcome = self.session.submit();
        if outcome.is_ok() {
            self.result_scroll = 0;
        }
        ignore_guard(outcome);
    }

    /// Start the quiz over as a new attempt.
    pub fn restart(&mut self) {
        self.session.reset();
        self.highlighted = 0;
        self.result_scroll = 0;
    }

    pub fn scroll_results_down(&mut self) {
        let limit = self.result_scroll_limit.get();
        self.result_scroll = (self.result_scroll() + 1).min(limit);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll().saturating_sub(1);
    }

    /// Put the cursor on the stored answer of the new current question.
    fn sync_highlight(&mut self) {
        let snapshot = self.session.snapshot();
        let question = snapshot.current_question();
        self.highlighted = snapshot
            .selected_answer(snapshot.current_index())
            .and_then(|answer| question.option_position(answer))
            .unwrap_or(0);
    }
}

/// The view only offers actions whose guard holds, so a rejection here is
/// a key pressed while its action was disabled.
fn ignore_guard(outcome: Result<(), SessionError>) {
    if let Err(err) = outcome {
        debug!(error = %err, "ignored quiz action");
    }
}
