mod loader;

pub use loader::{load_quiz_from_json, load_tool_result_from_json, parse_quiz, LoadError};
