//! Parameter structs for the request dispatcher.
//!
//! Every method's params deserialize from the request's `params` object.
//! Optional fields carry the protocol defaults; required text fields default
//! to empty and are rejected by the handler's validation instead of by serde,
//! so a missing field and an empty one produce the same error.

use serde::Deserialize;

use crate::memory::{knowledge, retention, store};

fn default_memory_type() -> String {
    "conversation".into()
}

fn default_category() -> String {
    "general".into()
}

fn default_importance() -> i64 {
    store::DEFAULT_IMPORTANCE
}

fn default_search_limit() -> usize {
    20
}

fn default_knowledge_type() -> String {
    "general".into()
}

fn default_confidence() -> f64 {
    knowledge::DEFAULT_CONFIDENCE
}

fn default_cleanup_days() -> i64 {
    retention::DEFAULT_MAX_AGE_DAYS
}

fn default_cleanup_min_importance() -> i64 {
    retention::DEFAULT_MIN_IMPORTANCE
}

fn default_similar_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct AddMemoryParams {
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_memory_type")]
    pub memory_type: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_importance")]
    pub importance: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchMemoriesParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct LearnParams {
    #[serde(default)]
    pub user_input: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPreferenceParams {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GetPreferenceParams {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub default: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct AddKnowledgeParams {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default = "default_knowledge_type")]
    pub knowledge_type: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
pub struct GetKnowledgeParams {
    pub file_path: Option<String>,
    pub knowledge_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    #[serde(default = "default_cleanup_days")]
    pub days: i64,
    #[serde(default = "default_cleanup_min_importance")]
    pub min_importance: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchIndexParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct FindSimilarParams {
    #[serde(default)]
    pub record_id: String,
    #[serde(default = "default_similar_limit")]
    pub limit: usize,
}
