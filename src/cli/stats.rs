use anyhow::Result;

use crate::config::MnemoConfig;
use crate::memory::types::MemoryType;

/// Display store statistics in the terminal.
pub fn stats(config: &MnemoConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let response = crate::memory::stats::statistics(&conn, &db_path.display().to_string())?;

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total memories:      {}", response.total_memories);
    println!("  Preferences:         {}", response.total_preferences);
    println!("  Knowledge records:   {}", response.total_knowledge);
    println!("  Average importance:  {:.2}", response.avg_importance);
    println!();

    println!("By Type:");
    for ty in MemoryType::all() {
        let count = response
            .memory_types
            .get(ty.as_str())
            .copied()
            .unwrap_or(0);
        println!("  {:<14} {}", ty.as_str(), count);
    }
    println!();

    if !response.categories.is_empty() {
        println!("By Category:");
        let mut categories: Vec<_> = response.categories.iter().collect();
        categories.sort();
        for (category, count) in categories {
            println!("  {:<14} {}", category, count);
        }
        println!();
    }

    println!(
        "Index terms:           {} ({} unique)",
        response.indexed_terms, response.unique_terms
    );
    println!("Fingerprints:          {}", response.fingerprints);
    println!("Database:              {}", response.database_path);

    Ok(())
}
