use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{QuestionError, QuizQuestion, ToolResult};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must contain at least one question", .path.display())]
    Empty { path: PathBuf },

    #[error("question {} in {} is invalid", .index + 1, .path.display())]
    InvalidQuestion {
        path: PathBuf,
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// The generator wraps questions in an object; hand-written files may not.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuizFile {
    Wrapped { quiz: Vec<QuizQuestion> },
    Bare(Vec<QuizQuestion>),
}

impl QuizFile {
    fn into_questions(self) -> Vec<QuizQuestion> {
        match self {
            QuizFile::Wrapped { quiz } => quiz,
            QuizFile::Bare(questions) => questions,
        }
    }
}

/// Load quiz questions from a JSON file.
///
/// Accepts either `[{...}, ...]` or `{"quiz": [{...}, ...]}`.
pub fn load_quiz_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<QuizQuestion>, LoadError> {
    let path = path.as_ref();
    let content = read(path)?;
    let questions = parse_quiz(&content, path)?;
    debug!(path = %path.display(), questions = questions.len(), "quiz loaded");
    Ok(questions)
}

/// Parse quiz JSON already in memory. `origin` is only used in errors.
pub fn parse_quiz(content: &str, origin: &Path) -> Result<Vec<QuizQuestion>, LoadError> {
    let file: QuizFile = serde_json::from_str(content).map_err(|source| LoadError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    let questions = file.into_questions();
    validate_questions(&questions, origin)?;
    Ok(questions)
}

/// Load a tagged tool result (`{"tool": ..., "data": ...}`) from a JSON file.
pub fn load_tool_result_from_json<P: AsRef<Path>>(path: P) -> Result<ToolResult, LoadError> {
    let path = path.as_ref();
    let content = read(path)?;
    let result: ToolResult = serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(questions) = result.quiz() {
        validate_questions(questions, path)?;
    }
    debug!(path = %path.display(), tool = %result.kind(), "tool result loaded");
    Ok(result)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_questions(questions: &[QuizQuestion], path: &Path) -> Result<(), LoadError> {
    if questions.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|source| LoadError::InvalidQuestion {
                path: path.to_path_buf(),
                index,
                source,
            })?;
    }
    Ok(())
}
