// Database layer: SQLite storage for the article catalogue, inferred
// references, and build state.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever REFGRAPH_DB_PATH points
// (defaults to ./refgraph.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteDatabase;
pub use traits::Database;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Open (or create) the database and run migrations.
///
/// This is the main entry point, called by `refgraph init` and by `ingest`,
/// which may be the first command run against a fresh path.
pub fn initialize(db_path: &str) -> Result<Connection> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    // WAL so a `graph` query can read while a rebuild is writing
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `refgraph init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Pick up tables added since the file was created
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Initialize SQLite and wrap it behind the Database trait.
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}

/// Open an existing SQLite database behind the Database trait.
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = open(db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}
