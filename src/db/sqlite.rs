// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across unrelated .await points.
//
// The free functions in queries.rs stay usable against a bare Connection,
// which is how their own tests exercise them.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::StoreCounts;
use super::traits::Database;
use crate::corpus::{Article, SourceCatalogue};
use crate::references::ArticleReference;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn replace_catalogue(&self, articles: &[Article]) -> Result<(usize, usize)> {
        let mut conn = self.conn.lock().await;
        super::queries::replace_catalogue(&mut conn, articles)
    }

    async fn get_articles(&self) -> Result<Vec<Article>> {
        let conn = self.conn.lock().await;
        super::queries::get_articles(&conn)
    }

    async fn get_source_catalogue(&self) -> Result<SourceCatalogue> {
        let conn = self.conn.lock().await;
        super::queries::get_source_catalogue(&conn)
    }

    async fn replace_references(
        &self,
        references: &[ArticleReference],
        sim_threshold: f64,
    ) -> Result<()> {
        let mut conn = self.conn.lock().await;
        super::queries::replace_references(&mut conn, references, sim_threshold)
    }

    async fn get_references(&self) -> Result<Vec<ArticleReference>> {
        let conn = self.conn.lock().await;
        super::queries::get_references(&conn)
    }

    async fn get_build_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_build_state(&conn, key)
    }

    async fn set_build_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_build_state(&conn, key, value)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let conn = self.conn.lock().await;
        super::queries::counts(&conn)
    }
}
