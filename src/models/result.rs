use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QuizQuestion;

/// Output of one study tool run against a document.
///
/// Serialized as `{"tool": "<tag>", "data": {...}}` so stored history stays
/// readable by anything that understands the generator's payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "data")]
pub enum ToolResult {
    #[serde(rename = "summary")]
    Summary { summary: String },

    #[serde(rename = "qa")]
    Answer { answer: String },

    #[serde(rename = "concept")]
    Explanation { explanation: String },

    #[serde(rename = "quiz")]
    Quiz { quiz: Vec<QuizQuestion> },
}

/// The tag of a [`ToolResult`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Summary,
    Answer,
    Explanation,
    Quiz,
}

impl ToolResult {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolResult::Summary { .. } => ToolKind::Summary,
            ToolResult::Answer { .. } => ToolKind::Answer,
            ToolResult::Explanation { .. } => ToolKind::Explanation,
            ToolResult::Quiz { .. } => ToolKind::Quiz,
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind().title()
    }

    /// The text body for the prose tools; `None` for quizzes.
    pub fn text(&self) -> Option<&str> {
        match self {
            ToolResult::Summary { summary } => Some(summary),
            ToolResult::Answer { answer } => Some(answer),
            ToolResult::Explanation { explanation } => Some(explanation),
            ToolResult::Quiz { .. } => None,
        }
    }

    pub fn quiz(&self) -> Option<&[QuizQuestion]> {
        match self {
            ToolResult::Quiz { quiz } => Some(quiz),
            _ => None,
        }
    }
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Summary,
        ToolKind::Answer,
        ToolKind::Explanation,
        ToolKind::Quiz,
    ];

    /// Wire tag used in stored history.
    pub fn tag(self) -> &'static str {
        match self {
            ToolKind::Summary => "summary",
            ToolKind::Answer => "qa",
            ToolKind::Explanation => "concept",
            ToolKind::Quiz => "quiz",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ToolKind::Summary => "Summary",
            ToolKind::Answer => "Answer",
            ToolKind::Explanation => "Explanation",
            ToolKind::Quiz => "Quiz",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == lower || kind.title().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| format!("unknown tool \"{}\" (expected summary, qa, concept or quiz)", s))
    }
}

/// A stored tool result, identified by the time it was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: DateTime<Utc>,
    #[serde(flatten)]
    pub result: ToolResult,
}

impl HistoryEntry {
    pub fn new(result: ToolResult) -> Self {
        Self {
            id: Utc::now(),
            result,
        }
    }
}

/// The quiz stored at 1-based `entry`, or the most recent quiz when no
/// entry is given. `None` if that entry is missing or is not a quiz.
pub fn find_quiz(history: &[HistoryEntry], entry: Option<usize>) -> Option<&[QuizQuestion]> {
    let found = match entry {
        Some(n) => history.get(n.checked_sub(1)?),
        None => history
            .iter()
            .rev()
            .find(|e| e.result.kind() == ToolKind::Quiz),
    }?;
    found.result.quiz()
}

/// Entries newest first, paired with their 1-based position in `history`,
/// keeping only results of `tool` when given.
pub fn newest_first(history: &[HistoryEntry], tool: Option<ToolKind>) -> Vec<(usize, &HistoryEntry)> {
    history
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, entry)| tool.is_none_or(|kind| kind == entry.result.kind()))
        .map(|(n, entry)| (n + 1, entry))
        .collect()
}

/// All stored entries for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHistory {
    pub document: String,
    pub history: Vec<HistoryEntry>,
}
