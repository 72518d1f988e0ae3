//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use blockhub_core::{Config, Database};

pub async fn run(config: &Config, db: Option<&Database>, format: OutputFormat) -> Result<()> {
    let stats = db.map(Database::get_stats).transpose()?;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "database": stats,
                "databasePath": db.map(|_| Config::database_path()),
                "search": config.search,
                "remote": config.remote.url,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            match stats {
                Some(stats) => {
                    println!("Database:        {}", Config::database_path().display());
                    println!(
                        "Schema version:  {}",
                        stats
                            .schema_version
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "-".to_string())
                    );
                    println!("Items:           {}", stats.total_items);
                    for count in &stats.modules {
                        println!(
                            "  {:<8}       {} ({} visible)",
                            count.module.label(),
                            count.items,
                            count.visible
                        );
                    }
                    println!(
                        "Last import:     {}",
                        stats.last_import.as_deref().unwrap_or("never")
                    );
                }
                None => {
                    println!(
                        "Remote:          {}",
                        config.remote.url.as_deref().unwrap_or("(not configured)")
                    );
                }
            }
            println!();
            println!("Search:");
            println!("  Pagination:    {}", config.search.pagination.as_str());
            println!("  Excerpt:       {} chars", config.search.excerpt_length);
            println!("  Max query:     {} chars", config.search.max_query_length);
        }
    }
    Ok(())
}
