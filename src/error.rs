//! Engine error taxonomy.
//!
//! Validation failures are caller errors and map to `success: false`
//! responses with the message verbatim; storage and serialization failures
//! wrap the underlying error. A missing record is never an error: lookups
//! return `Option`/empty collections instead.

use thiserror::Error;

/// Errors produced by the memory engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("preference key must not be empty")]
    EmptyKey,

    #[error("user_input must not be empty")]
    EmptyInput,

    #[error("record_id must not be empty")]
    EmptyRecordId,

    #[error("unknown memory type: {0}")]
    InvalidMemoryType(String),

    #[error("confidence must be between 0.0 and 1.0, got {0}")]
    InvalidConfidence(f64),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// True for errors caused by bad caller input rather than engine state.
    /// The dispatcher logs these at debug instead of error.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            EngineError::Database(_) | EngineError::Serialization(_)
        )
    }
}

/// Convenience alias used throughout the engine modules.
pub type Result<T> = std::result::Result<T, EngineError>;
