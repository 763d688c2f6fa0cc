// Database trait: async interface for all store operations.
//
// Implementor: SqliteDatabase (wraps rusqlite). The methods are async so the
// CLI can hold an `Arc<dyn Database>` and hand it to pipeline stages without
// caring how the connection is synchronized.
//
// The trait mirrors the queries.rs function signatures one-to-one.

use anyhow::Result;
use async_trait::async_trait;

use super::models::StoreCounts;
use crate::corpus::{Article, SourceCatalogue};
use crate::references::ArticleReference;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Catalogue ---

    /// Replace all articles and sources. Clears stored references.
    /// Returns (articles stored, sources derived).
    async fn replace_catalogue(&self, articles: &[Article]) -> Result<(usize, usize)>;

    /// Load every article, ordered by id.
    async fn get_articles(&self) -> Result<Vec<Article>>;

    /// Load sources plus the article→source lookup.
    async fn get_source_catalogue(&self) -> Result<SourceCatalogue>;

    // --- References ---

    /// Replace the stored reference set, recording the threshold used.
    async fn replace_references(
        &self,
        references: &[ArticleReference],
        sim_threshold: f64,
    ) -> Result<()>;

    /// Load the stored reference set.
    async fn get_references(&self) -> Result<Vec<ArticleReference>>;

    // --- Build state ---

    /// Get a build state value by key (e.g., "last_build_at").
    async fn get_build_state(&self, key: &str) -> Result<Option<String>>;

    /// Set a build state value (upsert).
    async fn set_build_state(&self, key: &str, value: &str) -> Result<()>;

    // --- Stats ---

    /// Row counts for articles, sources and references.
    async fn counts(&self) -> Result<StoreCounts>;
}
