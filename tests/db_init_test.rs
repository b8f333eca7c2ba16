use mnemo::db;
use rusqlite::Connection;
use tempfile::TempDir;

#[test]
fn full_schema_creates_all_tables_and_indexes() {
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();

    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    for table in [
        "memories",
        "preferences",
        "knowledge",
        "lexical_terms",
        "fingerprints",
        "schema_meta",
    ] {
        assert!(tables.contains(&table.to_string()), "{table} table missing");
    }

    let indexes: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert!(indexes.contains(&"idx_memories_type".to_string()));
    assert!(indexes.contains(&"idx_memories_category".to_string()));
    assert!(indexes.contains(&"idx_memories_importance".to_string()));
    assert!(indexes.contains(&"idx_terms_term".to_string()));
    assert!(indexes.contains(&"idx_terms_record".to_string()));

    let version: String = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, "1");

    // CHECK constraints hold at the SQL level too
    let bad_type = conn.execute(
        "INSERT INTO memories (id, content, memory_type, created_at, last_accessed) \
         VALUES ('t1', 'x', 'episodic', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        [],
    );
    assert!(bad_type.is_err(), "unknown memory type should be rejected");

    let bad_importance = conn.execute(
        "INSERT INTO memories (id, content, memory_type, importance, created_at, last_accessed) \
         VALUES ('t2', 'x', 'conversation', 11, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        [],
    );
    assert!(bad_importance.is_err(), "importance > 10 should be rejected");

    let bad_confidence = conn.execute(
        "INSERT INTO knowledge (id, content, confidence, created_at, updated_at) \
         VALUES ('k1', 'x', 1.5, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        [],
    );
    assert!(bad_confidence.is_err(), "confidence > 1 should be rejected");
}

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("new.db");

    assert!(!db_path.exists());

    let conn = db::open_database(&db_path).unwrap();

    assert!(db_path.exists());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn open_enables_wal_mode() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("test.db");

    let conn = db::open_database(&db_path).unwrap();

    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn reopen_preserves_stored_records() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("test.db");

    {
        let mut conn = db::open_database(&db_path).unwrap();
        mnemo::memory::store::add_memory(
            &mut conn,
            "persisted across opens",
            mnemo::memory::types::MemoryType::Conversation,
            "general",
            5,
            &[],
        )
        .unwrap();
    }

    let conn = db::open_database(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
