mod helpers;

use helpers::{has_fingerprint, insert_memory, insert_note, term_count, test_db};
use mnemo::memory::store::{get_memories, search_memories};
use mnemo::memory::types::MemoryType;

#[test]
fn store_and_read_back() {
    let mut conn = test_db();

    let id = insert_memory(
        &mut conn,
        "Deployed v2.3 on Friday",
        MemoryType::Conversation,
        "project",
        7,
    );

    let all = get_memories(&conn, None, None, 50, 1).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].content, "Deployed v2.3 on Friday");
    assert_eq!(all[0].importance, 7);
    assert_eq!(all[0].access_count, 0);
    assert_eq!(all[0].created_at, all[0].last_accessed);
}

#[test]
fn identical_content_stores_twice_with_distinct_ids() {
    let mut conn = test_db();

    let first = insert_note(&mut conn, "hello");
    let second = insert_note(&mut conn, "hello");

    assert_ne!(first, second);
    let all = get_memories(&conn, None, None, 50, 1).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn derived_caches_written_with_the_record() {
    let mut conn = test_db();

    let id = insert_note(
        &mut conn,
        "function render() builds the component tree for the html view",
    );

    assert!(term_count(&conn, &id) > 0);
    assert!(has_fingerprint(&conn, &id));
}

#[test]
fn get_memories_filters_by_type_and_category() {
    let mut conn = test_db();

    insert_memory(&mut conn, "fact one", MemoryType::Knowledge, "general", 5);
    insert_memory(&mut conn, "pattern", MemoryType::CodePattern, "rust", 5);
    insert_memory(&mut conn, "fact two", MemoryType::Knowledge, "rust", 5);

    let knowledge = get_memories(&conn, Some(MemoryType::Knowledge), None, 50, 1).unwrap();
    assert_eq!(knowledge.len(), 2);

    let rust = get_memories(&conn, None, Some("rust"), 50, 1).unwrap();
    assert_eq!(rust.len(), 2);

    let both = get_memories(&conn, Some(MemoryType::Knowledge), Some("rust"), 50, 1).unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].content, "fact two");
}

#[test]
fn get_memories_orders_by_importance_then_recency() {
    let mut conn = test_db();

    let low = insert_memory(&mut conn, "low", MemoryType::Conversation, "general", 2);
    let high = insert_memory(&mut conn, "high", MemoryType::Conversation, "general", 9);
    let mid = insert_memory(&mut conn, "mid", MemoryType::Conversation, "general", 5);

    let all = get_memories(&conn, None, None, 50, 1).unwrap();
    let ids: Vec<&str> = all.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![high.as_str(), mid.as_str(), low.as_str()]);

    // min_importance is inclusive
    let filtered = get_memories(&conn, None, None, 50, 5).unwrap();
    assert_eq!(filtered.len(), 2);
}

#[test]
fn search_bumps_counters_and_reports_new_values() {
    let mut conn = test_db();

    let id = insert_note(&mut conn, "the deploy pipeline");
    insert_note(&mut conn, "unrelated note");

    let results = search_memories(&mut conn, "pipeline", 20).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, id);
    // the response reflects the access this search just recorded
    assert_eq!(results[0].access_count, 1);

    let stored: u32 = conn
        .query_row(
            "SELECT access_count FROM memories WHERE id = ?1",
            [&id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, 1);

    // the miss was untouched
    let all = get_memories(&conn, None, None, 50, 1).unwrap();
    let miss = all.iter().find(|m| m.id != id).unwrap();
    assert_eq!(miss.access_count, 0);
}

#[test]
fn search_matches_tags_and_category() {
    let mut conn = test_db();

    mnemo::memory::store::add_memory(
        &mut conn,
        "a note about the build",
        MemoryType::Conversation,
        "infra",
        5,
        &["deployment".to_string()],
    )
    .unwrap();

    let by_tag = search_memories(&mut conn, "deployment", 20).unwrap();
    assert_eq!(by_tag.len(), 1);

    let by_category = search_memories(&mut conn, "infra", 20).unwrap();
    assert_eq!(by_category.len(), 1);

    let by_content = search_memories(&mut conn, "BUILD", 20).unwrap();
    assert_eq!(by_content.len(), 1, "matching is case-insensitive");
}

#[test]
fn search_treats_wildcards_literally() {
    let mut conn = test_db();

    insert_note(&mut conn, "coverage hit 100% today");
    insert_note(&mut conn, "coverage hit 100x today");

    let results = search_memories(&mut conn, "100%", 20).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].content.contains("100%"));
}

#[test]
fn empty_inputs_are_rejected() {
    let mut conn = test_db();

    let add = mnemo::memory::store::add_memory(
        &mut conn,
        "",
        MemoryType::Conversation,
        "general",
        5,
        &[],
    );
    assert!(add.is_err());

    let search = search_memories(&mut conn, "", 20);
    assert!(search.is_err());
}

#[test]
fn importance_is_clamped_into_range() {
    let mut conn = test_db();

    let too_low = insert_memory(&mut conn, "low", MemoryType::Conversation, "general", -3);
    let too_high = insert_memory(&mut conn, "high", MemoryType::Conversation, "general", 42);

    let all = get_memories(&conn, None, None, 50, 1).unwrap();
    let low = all.iter().find(|m| m.id == too_low).unwrap();
    let high = all.iter().find(|m| m.id == too_high).unwrap();
    assert_eq!(low.importance, 1);
    assert_eq!(high.importance, 10);
}
