//! Memory write and read paths.
//!
//! [`add_memory`] is the single write entry point. It runs the full pipeline
//! inside a transaction: validate, insert into the memories table, rebuild the
//! record's lexical index rows, and store its fingerprint. Reads come in two
//! flavors: [`get_memories`] is side-effect free, [`search_memories`] bumps
//! access counters for every record it returns, in the same transaction.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};

use crate::error::{EngineError, Result};
use crate::memory::types::{MemoryRecord, MemoryType};
use crate::{fingerprint, index};

/// Importance assigned when the caller does not provide one.
pub const DEFAULT_IMPORTANCE: i64 = 5;

const MEMORY_COLUMNS: &str =
    "id, content, memory_type, category, importance, created_at, last_accessed, access_count, tags";

/// Full write path: validate → insert → reindex → fingerprint, atomically.
///
/// Importance is clamped to `[1, 10]`. Identical content stored twice gets
/// two records with distinct ids — memories are never deduplicated.
pub fn add_memory(
    conn: &mut Connection,
    content: &str,
    memory_type: MemoryType,
    category: &str,
    importance: i64,
    tags: &[String],
) -> Result<String> {
    if content.is_empty() {
        return Err(EngineError::EmptyContent);
    }

    let importance = importance.clamp(1, 10);
    let now = Utc::now();
    let created_at = now.to_rfc3339();
    // Nanosecond precision keeps ids distinct for back-to-back identical content
    let id = memory_id(content, &now.to_rfc3339_opts(SecondsFormat::Nanos, true));
    let tags_json = serde_json::to_string(tags)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO memories (id, content, memory_type, category, importance, created_at, last_accessed, access_count, tags) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 0, ?7)",
        params![
            id,
            content,
            memory_type.as_str(),
            category,
            importance,
            created_at,
            tags_json,
        ],
    )?;
    index::reindex(&tx, &id, content)?;
    fingerprint::upsert(&tx, &id, content)?;
    tx.commit()?;

    Ok(id)
}

/// Derive a record id from content and its creation instant.
fn memory_id(content: &str, instant: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(instant.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// List memories with optional type/category filters. No side effects.
///
/// Ordered by importance, then recency of access; records that tie on both
/// come back in insertion order.
pub fn get_memories(
    conn: &Connection,
    filter_type: Option<MemoryType>,
    filter_category: Option<&str>,
    limit: usize,
    min_importance: i64,
) -> Result<Vec<MemoryRecord>> {
    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories \
         WHERE importance >= ?1 \
           AND (?2 IS NULL OR memory_type = ?2) \
           AND (?3 IS NULL OR category = ?3) \
         ORDER BY importance DESC, last_accessed DESC, rowid ASC \
         LIMIT ?4"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            min_importance,
            filter_type.map(|t| t.as_str()),
            filter_category,
            limit as i64,
        ],
        memory_from_row,
    )?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Substring search over content, tags, and category, case-insensitive.
///
/// Every returned record gets its access_count incremented and last_accessed
/// refreshed inside the same transaction; the returned structs carry the
/// post-increment values. Ranking uses the pre-increment counters.
pub fn search_memories(
    conn: &mut Connection,
    query: &str,
    limit: usize,
) -> Result<Vec<MemoryRecord>> {
    if query.is_empty() {
        return Err(EngineError::EmptyQuery);
    }

    let pattern = format!("%{}%", index::escape_like(query));
    let tx = conn.transaction()?;

    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories \
         WHERE content LIKE ?1 ESCAPE '\\' \
            OR tags LIKE ?1 ESCAPE '\\' \
            OR category LIKE ?1 ESCAPE '\\' \
         ORDER BY importance DESC, access_count DESC, rowid ASC \
         LIMIT ?2"
    );
    let mut records = {
        let mut stmt = tx.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern, limit as i64], memory_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let now = Utc::now().to_rfc3339();
    {
        let mut update = tx.prepare(
            "UPDATE memories SET access_count = access_count + 1, last_accessed = ?1 WHERE id = ?2",
        )?;
        for record in &mut records {
            update.execute(params![now, record.id])?;
            record.access_count += 1;
            record.last_accessed = now.clone();
        }
    }

    tx.commit()?;
    Ok(records)
}

fn memory_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let type_str: String = row.get(2)?;
    let tags_json: String = row.get(8)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        memory_type: type_str.parse().unwrap_or(MemoryType::Conversation),
        category: row.get(3)?,
        importance: row.get(4)?,
        created_at: row.get(5)?,
        last_accessed: row.get(6)?,
        access_count: row.get(7)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
    })
}
