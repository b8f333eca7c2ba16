use anyhow::Result;

use crate::config::MnemoConfig;
use crate::memory::retention;

/// Run a retention pass from the terminal.
pub fn cleanup(config: &MnemoConfig, days: i64, min_importance: i64) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    let deleted = retention::cleanup(&mut conn, days, min_importance)?;

    if deleted == 0 {
        println!("No stale memories found.");
    } else {
        println!("Deleted {deleted} stale memories.");
    }

    Ok(())
}
