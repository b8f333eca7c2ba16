mod helpers;

use mnemo::config::MnemoConfig;
use mnemo::dispatch::{Dispatcher, Request, METHODS};
use serde_json::{json, Value};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(helpers::test_db(), MnemoConfig::default())
}

fn call(d: &mut Dispatcher, method: &str, params: Value) -> Value {
    d.dispatch(&Request {
        method: method.into(),
        params,
    })
}

#[test]
fn typescript_preference_flow() {
    let mut d = dispatcher();

    let added = call(
        &mut d,
        "add_memory",
        json!({
            "content": "User prefers TypeScript for frontend work",
            "memory_type": "preference",
            "category": "preference",
            "importance": 8,
            "tags": ["typescript", "frontend"]
        }),
    );
    assert_eq!(added["success"], json!(true));
    let id = added["memory_id"].as_str().unwrap().to_string();

    let found = call(
        &mut d,
        "search_memories",
        json!({"query": "typescript", "limit": 5}),
    );
    assert_eq!(found["success"], json!(true));
    assert_eq!(found["count"], json!(1));
    let hit = &found["memories"][0];
    assert_eq!(hit["id"].as_str().unwrap(), id);
    assert_eq!(hit["type"], json!("preference"));
    assert_eq!(hit["importance"], json!(8));
    assert_eq!(hit["access_count"], json!(1));

    let stats = call(&mut d, "get_statistics", json!({}));
    assert_eq!(stats["statistics"]["total_memories"], json!(1));
    assert_eq!(stats["statistics"]["memory_types"]["preference"], json!(1));
    assert_eq!(stats["statistics"]["categories"]["preference"], json!(1));

    let context = call(&mut d, "get_user_context", json!({}));
    assert_eq!(context["summary"]["total_memories"], json!(1));
}

#[test]
fn unknown_method_changes_nothing() {
    let mut d = dispatcher();

    let response = call(&mut d, "frobnicate", json!({"content": "sneaky"}));
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["error"], json!("unknown method: frobnicate"));
    let listed: Vec<&str> = response["available_methods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(listed, METHODS.to_vec());

    let stats = call(&mut d, "get_statistics", json!({}));
    assert_eq!(stats["statistics"]["total_memories"], json!(0));
    assert_eq!(stats["statistics"]["total_preferences"], json!(0));
    assert_eq!(stats["statistics"]["total_knowledge"], json!(0));
}

#[test]
fn malformed_line_then_business_as_usual() {
    let mut d = dispatcher();

    let bad = d.handle_line("{\"method\": ");
    assert_eq!(bad["success"], json!(false));
    assert_eq!(bad["error"], json!("invalid request"));

    let bad = d.handle_line("\"just a string\"");
    assert_eq!(bad["success"], json!(false));

    let good = d.handle_line(r#"{"method": "add_memory", "params": {"content": "still alive"}}"#);
    assert_eq!(good["success"], json!(true));
}

#[test]
fn similar_records_rank_by_shared_language() {
    let mut d = dispatcher();

    let first = call(
        &mut d,
        "add_memory",
        json!({"content": "deploy the api server to production"}),
    );
    let second = call(
        &mut d,
        "add_memory",
        json!({"content": "deploy the web server to staging"}),
    );
    call(
        &mut d,
        "add_memory",
        json!({"content": "bake chocolate cake with dark cocoa"}),
    );

    let first_id = first["memory_id"].as_str().unwrap();
    let second_id = second["memory_id"].as_str().unwrap();

    let similar = call(&mut d, "find_similar", json!({"record_id": first_id}));
    assert_eq!(similar["success"], json!(true));
    // the unrelated recipe shares no terms and stays under the floor
    assert_eq!(similar["count"], json!(1));
    assert_eq!(similar["similar"][0]["record_id"].as_str().unwrap(), second_id);
    assert!(similar["similar"][0]["similarity"].as_f64().unwrap() > 0.1);
}

#[test]
fn validation_failures_answer_without_state_change() {
    let mut d = dispatcher();

    let cases = [
        ("add_memory", json!({})),
        ("add_memory", json!({"content": "x", "memory_type": "bogus"})),
        ("search_memories", json!({})),
        ("add_user_preference", json!({"value": 1})),
        ("get_user_preference", json!({})),
        ("add_project_knowledge", json!({})),
        ("add_project_knowledge", json!({"content": "x", "confidence": 2.0})),
        ("learn_from_conversation", json!({})),
        ("search_index", json!({})),
        ("find_similar", json!({})),
    ];

    for (method, params) in cases {
        let response = call(&mut d, method, params);
        assert_eq!(
            response["success"],
            json!(false),
            "{method} should have rejected"
        );
        assert!(response["error"].as_str().unwrap().len() > 0);
    }

    let stats = call(&mut d, "get_statistics", json!({}));
    assert_eq!(stats["statistics"]["total_memories"], json!(0));
}

#[test]
fn one_response_per_request_over_a_whole_session() {
    let mut d = dispatcher();

    let lines = [
        r#"{"method": "add_memory", "params": {"content": "alpha"}}"#,
        r#"not json"#,
        r#"{"method": "frobnicate"}"#,
        r#"{"method": "add_user_preference", "params": {"key": "k", "value": "v"}}"#,
        r#"{"method": "get_statistics"}"#,
    ];

    let mut responses = Vec::new();
    for line in lines {
        responses.push(d.handle_line(line));
    }

    assert_eq!(responses.len(), lines.len());
    for response in &responses {
        assert!(response.get("success").is_some());
    }
    assert_eq!(responses[4]["statistics"]["total_memories"], json!(1));
    assert_eq!(responses[4]["statistics"]["total_preferences"], json!(1));
}
