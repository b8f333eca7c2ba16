//! Project knowledge — content-keyed records that update in place.
//!
//! The id derives from (file_path, knowledge_type, content), so storing the
//! same triple again refreshes confidence and updated_at instead of creating
//! a duplicate. Knowledge rows participate in the lexical index and the
//! fingerprint scan exactly like memories.

use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};

use crate::error::{EngineError, Result};
use crate::memory::types::KnowledgeRecord;
use crate::{fingerprint, index};

/// Confidence assigned when the caller does not provide one.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Insert or refresh a knowledge record. Returns its deterministic id.
///
/// An existing triple keeps its created_at; confidence and updated_at take
/// the new values. Derived caches are rebuilt in the same transaction.
pub fn upsert_knowledge(
    conn: &mut Connection,
    file_path: &str,
    knowledge_type: &str,
    content: &str,
    confidence: f64,
) -> Result<String> {
    if content.is_empty() {
        return Err(EngineError::EmptyContent);
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err(EngineError::InvalidConfidence(confidence));
    }

    let id = knowledge_id(file_path, knowledge_type, content);
    let now = Utc::now().to_rfc3339();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO knowledge (id, file_path, knowledge_type, content, confidence, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
         ON CONFLICT(id) DO UPDATE SET confidence = excluded.confidence, updated_at = excluded.updated_at",
        params![id, file_path, knowledge_type, content, confidence, now],
    )?;
    index::reindex(&tx, &id, content)?;
    fingerprint::upsert(&tx, &id, content)?;
    tx.commit()?;

    Ok(id)
}

/// Derive the record id from the identity triple.
fn knowledge_id(file_path: &str, knowledge_type: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hasher.update(b":");
    hasher.update(knowledge_type.as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// List knowledge records, most trusted and most recently updated first.
///
/// `file_path` filters by substring, `knowledge_type` by exact match.
pub fn get_knowledge(
    conn: &Connection,
    file_path: Option<&str>,
    knowledge_type: Option<&str>,
) -> Result<Vec<KnowledgeRecord>> {
    let path_pattern = file_path.map(|p| format!("%{}%", index::escape_like(p)));
    let mut stmt = conn.prepare(
        "SELECT id, file_path, knowledge_type, content, confidence, created_at, updated_at \
         FROM knowledge \
         WHERE (?1 IS NULL OR file_path LIKE ?1 ESCAPE '\\') \
           AND (?2 IS NULL OR knowledge_type = ?2) \
         ORDER BY confidence DESC, updated_at DESC, rowid ASC",
    )?;
    let rows = stmt.query_map(params![path_pattern, knowledge_type], |row| {
        Ok(KnowledgeRecord {
            id: row.get(0)?,
            file_path: row.get(1)?,
            knowledge_type: row.get(2)?,
            content: row.get(3)?,
            confidence: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}
