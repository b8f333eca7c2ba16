pub mod cleanup;
pub mod reindex;
pub mod search;
pub mod stats;
