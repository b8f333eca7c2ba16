//! Core record type definitions.
//!
//! Defines [`MemoryType`] (the four memory categories), [`MemoryRecord`]
//! (a full memory row), and [`KnowledgeRecord`] (a project-knowledge row).

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The four memory categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// Facts captured from conversation.
    Conversation,
    /// Stated user preferences.
    Preference,
    /// Code idioms and snippets worth recalling.
    CodePattern,
    /// Standalone knowledge not tied to a file.
    Knowledge,
}

impl MemoryType {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Preference => "preference",
            Self::CodePattern => "code_pattern",
            Self::Knowledge => "knowledge",
        }
    }

    /// All categories, in schema order.
    pub fn all() -> [MemoryType; 4] {
        [
            Self::Conversation,
            Self::Preference,
            Self::CodePattern,
            Self::Knowledge,
        ]
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conversation" => Ok(Self::Conversation),
            "preference" => Ok(Self::Preference),
            "code_pattern" => Ok(Self::CodePattern),
            "knowledge" => Ok(Self::Knowledge),
            _ => Err(EngineError::InvalidMemoryType(s.to_string())),
        }
    }
}

/// A memory record, matching the `memories` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// SHA-256 over (content, creation instant) — stable across processes.
    pub id: String,
    /// The full text content of the memory.
    pub content: String,
    /// Memory category of this record.
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    /// Free-form grouping label (e.g. `"programming"`).
    pub category: String,
    /// Retention weight in `[1, 10]`.
    pub importance: u8,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last search hit (creation time if never hit).
    pub last_accessed: String,
    /// Number of times this record has been returned by a search.
    pub access_count: u32,
    /// Descriptive labels, stored as a JSON array.
    pub tags: Vec<String>,
}

/// A project-knowledge record, matching the `knowledge` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// SHA-256 over (file_path, knowledge_type, content).
    pub id: String,
    /// File the knowledge is about, or empty for project-wide items.
    pub file_path: String,
    /// Kind label (e.g. `"component"`, `"api"`, `"general"`).
    pub knowledge_type: String,
    /// The knowledge text itself.
    pub content: String,
    /// Trust weight in `[0.0, 1.0]`.
    pub confidence: f64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last upsert.
    pub updated_at: String,
}
