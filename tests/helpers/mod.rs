#![allow(dead_code)]

use mnemo::db;
use mnemo::memory::store;
use mnemo::memory::types::MemoryType;
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Insert a test memory through the store. Returns the memory ID.
pub fn insert_memory(
    conn: &mut Connection,
    content: &str,
    memory_type: MemoryType,
    category: &str,
    importance: i64,
) -> String {
    store::add_memory(conn, content, memory_type, category, importance, &[]).unwrap()
}

/// Insert a plain conversation memory with default importance.
pub fn insert_note(conn: &mut Connection, content: &str) -> String {
    insert_memory(conn, content, MemoryType::Conversation, "general", 5)
}

/// Rewrite a memory's created_at so it looks `days` old.
pub fn backdate(conn: &Connection, id: &str, days: i64) {
    let stamp = (chrono::Utc::now() - chrono::Duration::days(days)).to_rfc3339();
    conn.execute(
        "UPDATE memories SET created_at = ?1 WHERE id = ?2",
        rusqlite::params![stamp, id],
    )
    .unwrap();
}

/// Force a memory's access counter to a specific value.
pub fn set_access_count(conn: &Connection, id: &str, count: u32) {
    conn.execute(
        "UPDATE memories SET access_count = ?1 WHERE id = ?2",
        rusqlite::params![count, id],
    )
    .unwrap();
}

/// True if the memory row still exists.
pub fn memory_exists(conn: &Connection, id: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM memories WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}

/// Count rows in the lexical index owned by a record.
pub fn term_count(conn: &Connection, record_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM lexical_terms WHERE record_id = ?1",
        [record_id],
        |row| row.get(0),
    )
    .unwrap()
}

/// True if the record has a stored fingerprint.
pub fn has_fingerprint(conn: &Connection, record_id: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM fingerprints WHERE record_id = ?1",
            [record_id],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}
