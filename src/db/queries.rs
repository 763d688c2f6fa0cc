// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{StoreCounts, BUILD_SIM_THRESHOLD, LAST_BUILD_AT, LAST_INGEST_AT};
use crate::corpus::article::derive_sources;
use crate::corpus::{Article, ArticleId, Source, SourceCatalogue, SourceId};
use crate::references::ArticleReference;

const DATE_FORMAT: &str = "%Y-%m-%d";

// --- Catalogue ---

/// Replace the whole catalogue with a fresh article set.
///
/// Stored references point at the old article ids, so they're cleared too.
/// Returns (articles stored, sources derived).
pub fn replace_catalogue(conn: &mut Connection, articles: &[Article]) -> Result<(usize, usize)> {
    let sources = derive_sources(articles);
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM article_references", [])?;
    tx.execute("DELETE FROM articles", [])?;
    tx.execute("DELETE FROM sources", [])?;
    tx.execute(
        "DELETE FROM build_state WHERE key IN (?1, ?2)",
        params![LAST_BUILD_AT, BUILD_SIM_THRESHOLD],
    )?;

    {
        let mut insert_source = tx.prepare("INSERT INTO sources (id, name) VALUES (?1, ?2)")?;
        for source in &sources {
            insert_source.execute(params![source.id, source.name])?;
        }

        let source_ids: std::collections::HashMap<&str, SourceId> =
            sources.iter().map(|s| (s.name.as_str(), s.id)).collect();

        let mut insert_article = tx.prepare(
            "INSERT INTO articles (id, source_id, source, title, author, publish_date, location, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for article in articles {
            insert_article
                .execute(params![
                    article.id,
                    source_ids[article.source.as_str()],
                    article.source,
                    article.title,
                    article.author,
                    article.publish_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    article.location,
                    article.content,
                ])
                .with_context(|| format!("Failed to insert article {}", article.id))?;
        }
    }

    set_build_state(&tx, LAST_INGEST_AT, &chrono::Utc::now().to_rfc3339())?;
    tx.commit()?;

    Ok((articles.len(), sources.len()))
}

/// Load every article, ordered by id.
pub fn get_articles(conn: &Connection) -> Result<Vec<Article>> {
    let mut stmt = conn.prepare(
        "SELECT id, source, title, author, publish_date, location, content
         FROM articles
         ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, ArticleId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut articles = Vec::new();
    for row in rows {
        let (id, source, title, author, publish_date, location, content) = row?;
        let publish_date = publish_date
            .map(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT))
            .transpose()
            .with_context(|| format!("Article {id} has a malformed publish_date"))?;
        articles.push(Article {
            id,
            source,
            title,
            author,
            publish_date,
            location,
            content,
        });
    }
    Ok(articles)
}

/// Load the source list and article→source lookup as one snapshot.
pub fn get_source_catalogue(conn: &Connection) -> Result<SourceCatalogue> {
    let sources: Vec<Source> = conn
        .prepare("SELECT id, name FROM sources ORDER BY id")?
        .query_map([], |row| {
            Ok(Source {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;

    let article_sources: Vec<(ArticleId, SourceId)> = conn
        .prepare("SELECT id, source_id FROM articles")?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<_>>()?;

    SourceCatalogue::new(sources, article_sources)
}

// --- References ---

/// Replace the stored reference set and record the threshold it was built with.
pub fn replace_references(
    conn: &mut Connection,
    references: &[ArticleReference],
    sim_threshold: f64,
) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM article_references", [])?;

    {
        let mut insert = tx.prepare(
            "INSERT INTO article_references (from_id, to_id, similarity) VALUES (?1, ?2, ?3)",
        )?;
        for reference in references {
            insert.execute(params![
                reference.from_id,
                reference.to_id,
                reference.similarity
            ])?;
        }
    }

    set_build_state(&tx, LAST_BUILD_AT, &chrono::Utc::now().to_rfc3339())?;
    set_build_state(&tx, BUILD_SIM_THRESHOLD, &sim_threshold.to_string())?;
    tx.commit()?;
    Ok(())
}

/// Load the stored reference set.
pub fn get_references(conn: &Connection) -> Result<Vec<ArticleReference>> {
    let references = conn
        .prepare("SELECT from_id, to_id, similarity FROM article_references ORDER BY from_id, to_id")?
        .query_map([], |row| {
            Ok(ArticleReference {
                from_id: row.get(0)?,
                to_id: row.get(1)?,
                similarity: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(references)
}

// --- Build state ---

/// Get a build state value by key (e.g., "last_build_at").
pub fn get_build_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM build_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set a build state value (upsert).
pub fn set_build_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO build_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

// --- Stats ---

/// Row counts for status display.
pub fn counts(conn: &Connection) -> Result<StoreCounts> {
    let count = |table: &str| -> Result<i64> {
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n)
    };
    Ok(StoreCounts {
        articles: count("articles")?,
        sources: count("sources")?,
        references: count("article_references")?,
    })
}
