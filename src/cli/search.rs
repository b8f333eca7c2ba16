use anyhow::Result;

use crate::config::MnemoConfig;
use crate::memory::store;

/// Run a search from the terminal. Hits count as accesses, the same as
/// protocol searches.
pub fn search(config: &MnemoConfig, query: &str, limit: usize) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    let results = store::search_memories(&mut conn, query, limit)?;

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", results.len());

    for (i, memory) in results.iter().enumerate() {
        let preview: String = if memory.content.chars().count() > 120 {
            memory.content.chars().take(120).collect::<String>() + "..."
        } else {
            memory.content.clone()
        };

        println!(
            "  {}. [{}] {} (importance: {}, accessed: {})",
            i + 1,
            memory.memory_type,
            memory.id,
            memory.importance,
            memory.access_count,
        );
        println!("     {preview}");
        if !memory.tags.is_empty() {
            println!("     tags: {}", memory.tags.join(", "));
        }
        println!();
    }

    Ok(())
}
