//! User preference storage — key to JSON value, last write wins.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::{EngineError, Result};

/// Set a preference, replacing any previous value for the key.
pub fn set_preference(conn: &Connection, key: &str, value: &Value) -> Result<()> {
    if key.is_empty() {
        return Err(EngineError::EmptyKey);
    }
    conn.execute(
        "INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)",
        params![key, value.to_string(), Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Look up a preference. A missing key is `None`, not an error.
pub fn get_preference(conn: &Connection, key: &str) -> Result<Option<Value>> {
    if key.is_empty() {
        return Err(EngineError::EmptyKey);
    }
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// All preferences as a key-sorted map.
pub fn all_preferences(conn: &Connection) -> Result<serde_json::Map<String, Value>> {
    let mut stmt = conn.prepare("SELECT key, value FROM preferences ORDER BY key")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut map = serde_json::Map::new();
    for row in rows {
        let (key, json) = row?;
        map.insert(key, serde_json::from_str(&json)?);
    }
    Ok(map)
}
