//! Local persistent memory and semantic retrieval for AI-assisted sessions.
//!
//! mnemo stores free-text memory records on a single machine and answers
//! relevance-ranked queries over them, with no model downloads and no network
//! dependencies. Records come in three families:
//!
//! | Family | Keyed by | Duplicates |
//! |--------|----------|------------|
//! | **Memories** | content + creation instant | allowed |
//! | **Preferences** | caller-chosen key | last write wins |
//! | **Knowledge** | (file_path, type, content) | update in place |
//!
//! # Architecture
//!
//! - **Storage**: SQLite (bundled, WAL mode); every write runs in one
//!   transaction together with its derived-cache updates
//! - **Retrieval**: a lexical term index with context snippets, plus
//!   128-dimension deterministic text fingerprints ranked by cosine
//! - **Protocol**: newline-delimited JSON over stdio or TCP, processed
//!   strictly in arrival order by a single worker
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`dispatch`] — Method registry and request-to-response execution
//! - [`error`] — The engine error taxonomy
//! - [`fingerprint`] — Deterministic text fingerprints and similarity ranking
//! - [`index`] — Lexical term index with context snippets
//! - [`memory`] — Record store: memories, preferences, knowledge, retention

pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod memory;
