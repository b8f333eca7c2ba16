//! CLI `reindex` command — drop and rebuild every derived cache.

use anyhow::{Context, Result};

use crate::config::MnemoConfig;
use crate::db;
use crate::fingerprint;
use crate::index;

/// Rebuild the lexical index and all fingerprints from record content, then
/// record the fingerprint dimension the database now carries.
pub fn reindex(config: &MnemoConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = db::open_database(&db_path).context("failed to open database")?;

    println!("Rebuilding lexical index...");
    let indexed = index::rebuild(&mut conn)?;
    println!("  Indexed {indexed} records.");

    println!("Rebuilding fingerprints...");
    let fingerprinted = fingerprint::rebuild(&mut conn)?;
    println!("  Fingerprinted {fingerprinted} records.");

    db::migrations::set_fingerprint_dim(&conn, fingerprint::FINGERPRINT_DIM)?;

    println!("Reindex complete.");
    Ok(())
}
