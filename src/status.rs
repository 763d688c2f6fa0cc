// System status display: shows DB stats and build freshness.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::models::{BUILD_SIM_THRESHOLD, LAST_BUILD_AT, LAST_INGEST_AT, LAST_INGEST_DIR};
use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_display_path: &str) -> Result<()> {
    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let counts = db.counts().await?;
    println!(
        "Catalogue: {} articles from {} sources",
        counts.articles, counts.sources
    );

    match db.get_build_state(LAST_INGEST_AT).await? {
        Some(at) => match db.get_build_state(LAST_INGEST_DIR).await? {
            Some(dir) => println!("Last ingest: {at} from {dir}"),
            None => println!("Last ingest: {at}"),
        },
        None => {
            println!("Last ingest: never");
            println!("  Run `refgraph ingest` to load the news directory");
        }
    }

    match db.get_build_state(LAST_BUILD_AT).await? {
        Some(at) => {
            let threshold = db
                .get_build_state(BUILD_SIM_THRESHOLD)
                .await?
                .unwrap_or_else(|| "?".to_string());
            println!(
                "References: {} (built {at}, similarity > {threshold})",
                counts.references
            );
        }
        None => {
            println!("References: not built");
            if counts.articles > 0 {
                println!("  Run `refgraph build` to infer article references");
            }
        }
    }

    Ok(())
}

/// True when the database file has been created.
pub fn database_exists(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
