//! Importance-weighted expiry of memory records.
//!
//! A memory is deleted only when all three conditions hold: it was created
//! before the age cutoff, its importance is below the threshold, and it has
//! been returned by search fewer than two times. Preferences and knowledge
//! are never expired.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};

use crate::error::Result;

/// Age cutoff applied when the caller does not provide one.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 30;

/// Importance threshold applied when the caller does not provide one.
pub const DEFAULT_MIN_IMPORTANCE: i64 = 3;

/// Records accessed at least this many times are exempt from cleanup.
const ACCESS_EXEMPTION: i64 = 2;

/// Delete expired memories and their derived rows. Returns the deleted count.
pub fn cleanup(conn: &mut Connection, older_than_days: i64, min_importance: i64) -> Result<u64> {
    let cutoff = (Utc::now() - Duration::days(older_than_days)).to_rfc3339();

    let tx = conn.transaction()?;
    let ids: Vec<String> = {
        let mut stmt = tx.prepare(
            "SELECT id FROM memories \
             WHERE created_at < ?1 AND importance < ?2 AND access_count < ?3",
        )?;
        let rows = stmt.query_map(params![cutoff, min_importance, ACCESS_EXEMPTION], |row| {
            row.get(0)
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    {
        let mut drop_memory = tx.prepare("DELETE FROM memories WHERE id = ?1")?;
        let mut drop_terms = tx.prepare("DELETE FROM lexical_terms WHERE record_id = ?1")?;
        let mut drop_vector = tx.prepare("DELETE FROM fingerprints WHERE record_id = ?1")?;
        for id in &ids {
            drop_memory.execute(params![id])?;
            drop_terms.execute(params![id])?;
            drop_vector.execute(params![id])?;
        }
    }
    tx.commit()?;

    Ok(ids.len() as u64)
}
