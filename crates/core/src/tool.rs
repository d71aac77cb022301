//! Tool identifiers: the four dispatchable operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dispatchable tool.
///
/// The name returned by [`Tool::as_str`] is what gets written to the
/// `tool` column of the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Write,
    Summarize,
    Research,
    Edit,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Write, Tool::Summarize, Tool::Research, Tool::Edit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Write => "write",
            Tool::Summarize => "summarize",
            Tool::Research => "research",
            Tool::Edit => "edit",
        }
    }

    /// Human-readable description shown by front ends.
    pub fn description(&self) -> &'static str {
        match self {
            Tool::Write => "Generate new text from the prompt",
            Tool::Summarize => "Summarize the prompt text",
            Tool::Research => "Search the web for the prompt and write up the findings",
            Tool::Edit => "Edit and improve the prompt text",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool: {0} (expected write, summarize, research or edit)")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write" => Ok(Tool::Write),
            "summarize" | "summarise" => Ok(Tool::Summarize),
            "research" => Ok(Tool::Research),
            "edit" => Ok(Tool::Edit),
            _ => Err(UnknownTool(s.to_string())),
        }
    }
}
