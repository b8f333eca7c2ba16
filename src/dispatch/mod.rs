//! Request dispatcher: method registry plus sequential request execution.
//!
//! A [`Dispatcher`] owns the database connection and turns one request into
//! exactly one JSON response. It has no I/O of its own; transports feed it
//! lines and write back whatever it returns. Validation failures and storage
//! errors both become `success: false` responses, never panics.

pub mod params;

use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::MnemoConfig;
use crate::error::{EngineError, Result};
use crate::memory::types::MemoryType;
use crate::memory::{context, knowledge, learn, preferences, retention, stats, store};
use crate::{fingerprint, index};

/// Every method the dispatcher answers, in registry order.
pub const METHODS: [&str; 12] = [
    "add_memory",
    "search_memories",
    "get_user_context",
    "learn_from_conversation",
    "add_user_preference",
    "get_user_preference",
    "add_project_knowledge",
    "get_project_knowledge",
    "get_statistics",
    "cleanup_memories",
    "search_index",
    "find_similar",
];

/// One decoded request line.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

pub struct Dispatcher {
    conn: Connection,
    config: MnemoConfig,
    db_path: String,
}

impl Dispatcher {
    pub fn new(conn: Connection, config: MnemoConfig) -> Self {
        let db_path = config.resolved_db_path().display().to_string();
        Self {
            conn,
            config,
            db_path,
        }
    }

    /// Decode one protocol line and dispatch it. A line that is not a valid
    /// request object yields an error response rather than an `Err`.
    pub fn handle_line(&mut self, line: &str) -> Value {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.dispatch(&request),
            Err(err) => {
                tracing::debug!(error = %err, "malformed request line");
                json!({"success": false, "error": "invalid request"})
            }
        }
    }

    /// Route a request to its handler and fold any failure into a response.
    pub fn dispatch(&mut self, request: &Request) -> Value {
        let result = match request.method.as_str() {
            "add_memory" => self.add_memory(&request.params),
            "search_memories" => self.search_memories(&request.params),
            "get_user_context" => self.get_user_context(),
            "learn_from_conversation" => self.learn_from_conversation(&request.params),
            "add_user_preference" => self.add_user_preference(&request.params),
            "get_user_preference" => self.get_user_preference(&request.params),
            "add_project_knowledge" => self.add_project_knowledge(&request.params),
            "get_project_knowledge" => self.get_project_knowledge(&request.params),
            "get_statistics" => self.get_statistics(),
            "cleanup_memories" => self.cleanup_memories(&request.params),
            "search_index" => self.search_index(&request.params),
            "find_similar" => self.find_similar(&request.params),
            other => {
                tracing::debug!(method = %other, "unknown method");
                return json!({
                    "success": false,
                    "error": format!("unknown method: {other}"),
                    "available_methods": METHODS,
                });
            }
        };

        match result {
            Ok(payload) => payload,
            Err(err) => {
                if err.is_validation() {
                    tracing::debug!(method = %request.method, error = %err, "request rejected");
                } else {
                    tracing::error!(method = %request.method, error = %err, "request failed");
                }
                json!({"success": false, "error": err.to_string()})
            }
        }
    }

    fn add_memory(&mut self, params: &Value) -> Result<Value> {
        let p: params::AddMemoryParams = parse(params)?;
        let memory_type: MemoryType = p.memory_type.parse()?;
        let id = store::add_memory(
            &mut self.conn,
            &p.content,
            memory_type,
            &p.category,
            p.importance,
            &p.tags,
        )?;
        tracing::info!(id = %id, memory_type = %memory_type, "memory stored");
        Ok(json!({
            "success": true,
            "memory_id": id,
            "message": format!("memory stored: {}/{}", memory_type, p.category),
        }))
    }

    fn search_memories(&mut self, params: &Value) -> Result<Value> {
        let p: params::SearchMemoriesParams = parse(params)?;
        let memories = store::search_memories(&mut self.conn, &p.query, p.limit)?;
        Ok(json!({
            "success": true,
            "query": p.query,
            "count": memories.len(),
            "memories": memories,
        }))
    }

    fn get_user_context(&mut self) -> Result<Value> {
        let context = context::user_context(&self.conn, &self.db_path)?;
        let summary = json!({
            "total_memories": context.recent_memories.len(),
            "preferences_count": context
                .user_preferences
                .values()
                .filter(|v| !v.is_null())
                .count(),
            "knowledge_count": context.project_knowledge.len(),
        });
        Ok(json!({
            "success": true,
            "context": context,
            "summary": summary,
        }))
    }

    fn learn_from_conversation(&mut self, params: &Value) -> Result<Value> {
        let p: params::LearnParams = parse(params)?;
        let applied = learn::learn_from_conversation(
            &mut self.conn,
            &p.user_input,
            &self.config.learning.project_keywords,
        )?;
        Ok(json!({
            "success": true,
            "applied": applied,
            "message": if applied {
                "memory updated from conversation"
            } else {
                "nothing to learn from conversation"
            },
        }))
    }

    fn add_user_preference(&mut self, params: &Value) -> Result<Value> {
        let p: params::AddPreferenceParams = parse(params)?;
        preferences::set_preference(&self.conn, &p.key, &p.value)?;
        tracing::info!(key = %p.key, "preference updated");
        Ok(json!({
            "success": true,
            "key": p.key,
            "message": format!("preference updated: {}", p.key),
        }))
    }

    fn get_user_preference(&mut self, params: &Value) -> Result<Value> {
        let p: params::GetPreferenceParams = parse(params)?;
        let value = preferences::get_preference(&self.conn, &p.key)?.unwrap_or(p.default);
        Ok(json!({
            "success": true,
            "key": p.key,
            "value": value,
        }))
    }

    fn add_project_knowledge(&mut self, params: &Value) -> Result<Value> {
        let p: params::AddKnowledgeParams = parse(params)?;
        let id = knowledge::upsert_knowledge(
            &mut self.conn,
            &p.file_path,
            &p.knowledge_type,
            &p.content,
            p.confidence,
        )?;
        tracing::info!(id = %id, knowledge_type = %p.knowledge_type, "knowledge upserted");
        Ok(json!({
            "success": true,
            "knowledge_id": id,
            "message": format!("knowledge added: {}", p.knowledge_type),
        }))
    }

    fn get_project_knowledge(&mut self, params: &Value) -> Result<Value> {
        let p: params::GetKnowledgeParams = parse(params)?;
        let knowledge = knowledge::get_knowledge(
            &self.conn,
            p.file_path.as_deref(),
            p.knowledge_type.as_deref(),
        )?;
        Ok(json!({
            "success": true,
            "count": knowledge.len(),
            "knowledge": knowledge,
        }))
    }

    fn get_statistics(&mut self) -> Result<Value> {
        let statistics = stats::statistics(&self.conn, &self.db_path)?;
        Ok(json!({
            "success": true,
            "statistics": statistics,
        }))
    }

    fn cleanup_memories(&mut self, params: &Value) -> Result<Value> {
        let p: params::CleanupParams = parse(params)?;
        let deleted = retention::cleanup(&mut self.conn, p.days, p.min_importance)?;
        tracing::info!(deleted, days = p.days, "cleanup finished");
        Ok(json!({
            "success": true,
            "deleted_count": deleted,
            "message": format!("removed {deleted} stale memories"),
        }))
    }

    fn search_index(&mut self, params: &Value) -> Result<Value> {
        let p: params::SearchIndexParams = parse(params)?;
        if p.query.is_empty() {
            return Err(EngineError::EmptyQuery);
        }
        let hits = index::search(&self.conn, &p.query, p.limit)?;
        Ok(json!({
            "success": true,
            "query": p.query,
            "count": hits.len(),
            "results": hits,
        }))
    }

    fn find_similar(&mut self, params: &Value) -> Result<Value> {
        let p: params::FindSimilarParams = parse(params)?;
        if p.record_id.is_empty() {
            return Err(EngineError::EmptyRecordId);
        }
        let similar = fingerprint::find_similar(&self.conn, &p.record_id, p.limit)?;
        Ok(json!({
            "success": true,
            "record_id": p.record_id,
            "count": similar.len(),
            "similar": similar,
        }))
    }
}

fn parse<T: serde::de::DeserializeOwned>(params: &Value) -> Result<T> {
    serde_json::from_value(params.clone())
        .map_err(|err| EngineError::InvalidParams(err.to_string()))
}
