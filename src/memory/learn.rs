//! Heuristic rules that turn conversation turns into memories.
//!
//! Three independent rules inspect the user's input: stated preferences,
//! code discussion, and configured project keywords. Each rule that fires
//! stores one memory; a turn can trigger several rules at once.

use rusqlite::Connection;

use crate::error::{EngineError, Result};
use crate::memory::store;
use crate::memory::types::MemoryType;

/// Words that signal a stated preference.
const PREFERENCE_CUES: [&str; 6] = ["prefer", "like", "favorite", "usually", "always", "habit"];

/// Words that signal code discussion.
const CODE_CUES: [&str; 4] = ["function", "component", "class", "struct"];

/// Code discussion content is truncated to this many characters.
const CODE_SNIPPET_CHARS: usize = 200;

/// Apply the learning rules to one conversation turn.
///
/// Returns true when at least one rule stored a memory.
pub fn learn_from_conversation(
    conn: &mut Connection,
    user_input: &str,
    project_keywords: &[String],
) -> Result<bool> {
    if user_input.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let lower = user_input.to_lowercase();
    let mut applied = false;

    if PREFERENCE_CUES.iter().any(|cue| lower.contains(cue)) {
        store::add_memory(
            conn,
            &format!("User preference: {user_input}"),
            MemoryType::Preference,
            "user_preference",
            7,
            &["user_preference".to_string(), "conversation".to_string()],
        )?;
        applied = true;
    }

    if CODE_CUES.iter().any(|cue| lower.contains(cue)) {
        let snippet: String = user_input.chars().take(CODE_SNIPPET_CHARS).collect();
        store::add_memory(
            conn,
            &format!("Code discussion: {snippet}"),
            MemoryType::CodePattern,
            "programming",
            6,
            &[
                "code".to_string(),
                "pattern".to_string(),
                "discussion".to_string(),
            ],
        )?;
        applied = true;
    }

    if project_keywords
        .iter()
        .any(|kw| !kw.is_empty() && lower.contains(kw.to_lowercase().as_str()))
    {
        store::add_memory(
            conn,
            &format!("Project discussion: {user_input}"),
            MemoryType::Conversation,
            "project",
            8,
            &["project".to_string(), "discussion".to_string()],
        )?;
        applied = true;
    }

    Ok(applied)
}
