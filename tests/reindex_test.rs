mod helpers;

use helpers::{insert_note, test_db};
use mnemo::memory::knowledge::upsert_knowledge;
use mnemo::{fingerprint, index};

#[test]
fn rebuild_restores_truncated_caches() {
    let mut conn = test_db();

    let memory_id = insert_note(
        &mut conn,
        "function parse() { return tokens } function scan() { return chars }",
    );
    let knowledge_id =
        upsert_knowledge(&mut conn, "src/parse.rs", "api", "function entry points", 0.8).unwrap();

    // wipe the derived caches behind the store's back
    conn.execute("DELETE FROM lexical_terms", []).unwrap();
    conn.execute("DELETE FROM fingerprints", []).unwrap();

    assert!(index::search(&conn, "function", 20).unwrap().is_empty());
    assert!(fingerprint::find_similar(&conn, &memory_id, 10)
        .unwrap()
        .is_empty());

    let indexed = index::rebuild(&mut conn).unwrap();
    let fingerprinted = fingerprint::rebuild(&mut conn).unwrap();
    // both record families are covered
    assert_eq!(indexed, 2);
    assert_eq!(fingerprinted, 2);

    let hits = index::search(&conn, "function", 20).unwrap();
    let hit_ids: Vec<&str> = hits.iter().map(|h| h.record_id.as_str()).collect();
    assert!(hit_ids.contains(&memory_id.as_str()));
    assert!(hit_ids.contains(&knowledge_id.as_str()));

    assert!(fingerprint::load(&conn, &memory_id).unwrap().is_some());
    assert!(fingerprint::load(&conn, &knowledge_id).unwrap().is_some());
}

#[test]
fn rebuild_discards_rows_for_deleted_records() {
    let mut conn = test_db();

    insert_note(&mut conn, "function alpha() {}");

    // orphan rows left behind by an out-of-band delete
    conn.execute(
        "INSERT INTO lexical_terms (term, record_id, relevance, context, created_at) \
         VALUES ('ghost', 'gone', 1.0, '', '2024-01-01T00:00:00Z')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT OR REPLACE INTO fingerprints (record_id, vector, updated_at) \
         VALUES ('gone', x'00000000', '2024-01-01T00:00:00Z')",
        [],
    )
    .unwrap();

    index::rebuild(&mut conn).unwrap();
    fingerprint::rebuild(&mut conn).unwrap();

    let ghost_terms: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM lexical_terms WHERE record_id = 'gone'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(ghost_terms, 0);

    let ghost_prints: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM fingerprints WHERE record_id = 'gone'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(ghost_prints, 0);
}
