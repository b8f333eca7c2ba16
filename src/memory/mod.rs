pub mod context;
pub mod knowledge;
pub mod learn;
pub mod preferences;
pub mod retention;
pub mod stats;
pub mod store;
pub mod types;
