mod question;
mod result;

pub use question::{QuestionError, QuizQuestion, OPTIONS_PER_QUESTION};
pub use result::{find_quiz, newest_first, DocumentHistory, HistoryEntry, ToolKind, ToolResult};
