//! # learnsense
//!
//! Study companion for documents: keeps a per-document history of
//! AI study-tool results (summaries, answers, concept explanations and
//! quizzes) and lets you take generated quizzes in the terminal.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use learnsense::{LearnSenseError, Quiz};
//!
//! fn main() -> Result<(), LearnSenseError> {
//!     // Load a generated quiz
//!     let quiz = Quiz::from_json("quiz.json")?;
//!
//!     // Take it in the terminal and inspect the last attempt
//!     let outcome = quiz.run()?;
//!     println!("score: {:?}", outcome.score());
//!
//!     Ok(())
//! }
//! ```

mod app;
pub mod config;
mod data;
pub mod history;
mod models;
pub mod session;
pub mod terminal;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;
use tracing::info;

pub use app::App;
pub use config::{Config, ConfigError};
pub use data::{load_quiz_from_json, load_tool_result_from_json, parse_quiz, LoadError};
pub use history::{HistoryError, HistoryStore};
pub use models::{
    find_quiz, newest_first, DocumentHistory, HistoryEntry, QuestionError, QuizQuestion, ToolKind,
    ToolResult, OPTIONS_PER_QUESTION,
};
pub use session::{QuizSession, QuizSnapshot, SessionError};

/// Error type for learnsense operations.
#[derive(Debug, Error)]
pub enum LearnSenseError {
    #[error("failed to load input")]
    Load(#[from] LoadError),

    #[error("cannot start quiz")]
    Session(#[from] SessionError),

    #[error("history operation failed")]
    History(#[from] HistoryError),

    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("terminal error")]
    Io(#[from] io::Error),
}

/// A quiz that can be taken in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    /// Create a quiz from questions; `title` is shown in the header.
    pub fn new(questions: Vec<QuizQuestion>, title: impl Into<String>) -> Result<Self, LearnSenseError> {
        Ok(Self {
            app: App::with_questions(questions, title)?,
        })
    }

    /// Load a quiz from a JSON file, titled with the file name.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, LearnSenseError> {
        let path = path.as_ref();
        let questions = load_quiz_from_json(path)?;
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Quiz".to_string());
        Self::new(questions, title)
    }

    /// Take over the terminal until the user quits, then return the
    /// state of the last attempt.
    pub fn run(mut self) -> Result<Arc<QuizSnapshot>, LearnSenseError> {
        let mut guard = terminal::TerminalGuard::enter()?;
        run_event_loop(guard.terminal(), &mut self.app)?;
        drop(guard);

        let outcome = self.app.snapshot();
        info!(
            session = %self.app.session().id(),
            attempt = outcome.attempt(),
            submitted = outcome.is_submitted(),
            score = outcome.score(),
            "quiz closed"
        );
        Ok(outcome)
    }
}

fn run_event_loop(terminal: &mut terminal::AppTerminal, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            handle_input(app, key.code);
        }
    }

    Ok(())
}

/// Apply one key press to the app.
pub fn handle_input(app: &mut App, key: KeyCode) {
    if app.snapshot().is_submitted() {
        handle_graded_input(app, key);
    } else {
        handle_quiz_input(app, key);
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.highlight_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.highlight_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose_highlighted(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => app.next_question(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => app.previous_question(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.submit(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_graded_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}
