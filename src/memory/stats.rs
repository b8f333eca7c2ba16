use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::memory::types::MemoryType;

/// Store-wide statistics, as returned by `get_statistics`.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_memories: u64,
    /// Count per memory type; every type is present, zero-filled.
    pub memory_types: HashMap<String, u64>,
    /// Count per category; only categories in use appear.
    pub categories: HashMap<String, u64>,
    /// Mean importance over all memories, rounded to two decimals.
    pub avg_importance: f64,
    pub total_preferences: u64,
    pub total_knowledge: u64,
    pub indexed_terms: u64,
    pub unique_terms: u64,
    pub fingerprints: u64,
    pub database_path: String,
}

/// Compute statistics over the whole store.
pub fn statistics(conn: &Connection, database_path: &str) -> Result<Statistics> {
    Ok(Statistics {
        total_memories: count(conn, "SELECT COUNT(*) FROM memories")?,
        memory_types: count_by_type(conn)?,
        categories: count_by_category(conn)?,
        avg_importance: avg_importance(conn)?,
        total_preferences: count(conn, "SELECT COUNT(*) FROM preferences")?,
        total_knowledge: count(conn, "SELECT COUNT(*) FROM knowledge")?,
        indexed_terms: count(conn, "SELECT COUNT(*) FROM lexical_terms")?,
        unique_terms: count(conn, "SELECT COUNT(DISTINCT term) FROM lexical_terms")?,
        fingerprints: count(conn, "SELECT COUNT(*) FROM fingerprints")?,
        database_path: database_path.to_string(),
    })
}

fn count(conn: &Connection, sql: &str) -> Result<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

/// Count by memory type, zero-filling the types not in use.
fn count_by_type(conn: &Connection) -> Result<HashMap<String, u64>> {
    let mut map = HashMap::new();
    for ty in MemoryType::all() {
        map.insert(ty.as_str().to_string(), 0);
    }

    let mut stmt = conn.prepare("SELECT memory_type, COUNT(*) FROM memories GROUP BY memory_type")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (ty, n) = row?;
        map.insert(ty, n as u64);
    }
    Ok(map)
}

fn count_by_category(conn: &Connection) -> Result<HashMap<String, u64>> {
    let mut stmt = conn.prepare("SELECT category, COUNT(*) FROM memories GROUP BY category")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

    let mut map = HashMap::new();
    for row in rows {
        let (category, n) = row?;
        map.insert(category, n as u64);
    }
    Ok(map)
}

fn avg_importance(conn: &Connection) -> Result<f64> {
    let avg: Option<f64> = conn.query_row("SELECT AVG(importance) FROM memories", [], |row| {
        row.get(0)
    })?;
    Ok((avg.unwrap_or(0.0) * 100.0).round() / 100.0)
}
