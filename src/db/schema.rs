// Database schema: table creation and migrations.
//
// Same versioned approach as any long-lived store: a `schema_version` table
// tracks which migrations have run, and each migration is a function that
// executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent and safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Publishing outlets, ids assigned by ascending name at ingest time
        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        -- The article catalogue (immutable between re-ingestions)
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY,
            source_id INTEGER NOT NULL REFERENCES sources(id),
            source TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL DEFAULT '',
            publish_date TEXT,                 -- YYYY-MM-DD, NULL when unknown
            location TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT ''
        );

        -- Inferred article -> article references (later article first)
        CREATE TABLE IF NOT EXISTS article_references (
            from_id INTEGER NOT NULL REFERENCES articles(id),
            to_id INTEGER NOT NULL REFERENCES articles(id),
            similarity REAL NOT NULL,          -- cosine similarity, 0.0 to 1.0
            PRIMARY KEY (from_id, to_id)
        );

        -- Build state: last ingest/build timestamps and the threshold used
        CREATE TABLE IF NOT EXISTS build_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Index for source lookups during aggregation
        CREATE INDEX IF NOT EXISTS idx_articles_source
            ON articles(source_id);

        -- Index for per-query similarity filtering
        CREATE INDEX IF NOT EXISTS idx_references_similarity
            ON article_references(similarity);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        // Running create_tables twice should not error
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let count = table_count(&conn).unwrap();
        // schema_version, sources, articles, article_references, build_state
        assert_eq!(count, 5i64);
    }

    #[test]
    fn test_schema_version_recorded_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![1]);
    }
}
