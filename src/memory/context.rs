//! Assembled user context for session bootstrap.
//!
//! One call that gathers what a fresh session needs: high-importance recent
//! memories, every stored preference, the most trusted knowledge, and store
//! statistics. Reading context never touches access counters.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::Result;
use crate::memory::stats::{self, Statistics};
use crate::memory::types::{KnowledgeRecord, MemoryRecord};
use crate::memory::{knowledge, preferences, store};

/// How many memories the context includes.
pub const RECENT_LIMIT: usize = 20;

/// Memories below this importance stay out of the context.
pub const RECENT_MIN_IMPORTANCE: i64 = 6;

/// How many knowledge records the context includes.
pub const KNOWLEDGE_LIMIT: usize = 10;

/// Everything `get_user_context` returns.
#[derive(Debug, Serialize)]
pub struct UserContext {
    pub recent_memories: Vec<MemoryRecord>,
    pub user_preferences: serde_json::Map<String, serde_json::Value>,
    pub project_knowledge: Vec<KnowledgeRecord>,
    pub statistics: Statistics,
}

/// Assemble the context snapshot.
pub fn user_context(conn: &Connection, database_path: &str) -> Result<UserContext> {
    let recent_memories =
        store::get_memories(conn, None, None, RECENT_LIMIT, RECENT_MIN_IMPORTANCE)?;
    let user_preferences = preferences::all_preferences(conn)?;
    let mut project_knowledge = knowledge::get_knowledge(conn, None, None)?;
    project_knowledge.truncate(KNOWLEDGE_LIMIT);
    let statistics = stats::statistics(conn, database_path)?;

    Ok(UserContext {
        recent_memories,
        user_preferences,
        project_knowledge,
        statistics,
    })
}
