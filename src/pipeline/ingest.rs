// Ingestion pipeline: read a news directory into the article catalogue.
//
// Layout: one subdirectory per outlet, one file per article, the file stem
// being the article id. The subdirectory name is only a fallback; the
// SOURCE header inside each file is authoritative.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::corpus::parse::read_article;
use crate::corpus::Article;
use crate::db::models::LAST_INGEST_DIR;
use crate::db::Database;

/// Collect every article file under `news_dir`, paired with its outlet
/// directory name. Files sitting directly in `news_dir` use an empty
/// fallback source. Sorted by path so ingestion order is reproducible.
pub fn discover_article_files(news_dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let entries = std::fs::read_dir(news_dir)
        .with_context(|| format!("Failed to read news directory {}", news_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            let outlet = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let inner = std::fs::read_dir(&path)
                .with_context(|| format!("Failed to read outlet directory {}", path.display()))?;
            for inner_entry in inner {
                let file = inner_entry?.path();
                if file.is_file() {
                    files.push((file, outlet.clone()));
                }
            }
        } else if path.is_file() {
            files.push((path, String::new()));
        }
    }

    files.sort();
    Ok(files)
}

/// Parse every article under `news_dir`.
///
/// Duplicate ids keep the first file in path order and log a warning; the
/// catalogue keys articles by id.
pub fn load_articles(news_dir: &Path) -> Result<Vec<Article>> {
    let files = discover_article_files(news_dir)?;
    info!(files = files.len(), dir = %news_dir.display(), "Discovered article files");

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Parsing [{bar:30}] {pos}/{len} ({eta})")
            .context("Invalid progress bar template")?,
    );

    let mut seen: HashSet<i64> = HashSet::new();
    let mut articles = Vec::with_capacity(files.len());
    for (path, outlet) in &files {
        pb.inc(1);
        let Some(article) = read_article(path, outlet)? else {
            continue;
        };
        if !seen.insert(article.id) {
            warn!(id = article.id, path = %path.display(), "Duplicate article id, keeping the first");
            continue;
        }
        articles.push(article);
    }

    pb.finish_and_clear();

    articles.sort_by_key(|a| a.id);
    let undated = articles.iter().filter(|a| a.publish_date.is_none()).count();
    if undated > 0 {
        warn!(undated, "Articles without a publish date will not take part in references");
    }

    Ok(articles)
}

/// Re-ingest the catalogue from `news_dir`.
///
/// Returns (articles stored, sources derived). Stored references are
/// invalidated; run a rebuild afterwards.
pub async fn run(db: &Arc<dyn Database>, news_dir: &Path) -> Result<(usize, usize)> {
    let dir = news_dir.to_path_buf();
    let articles = tokio::task::spawn_blocking(move || load_articles(&dir))
        .await
        .context("Article parsing task panicked")??;

    let (article_count, source_count) = db.replace_catalogue(&articles).await?;
    db.set_build_state(LAST_INGEST_DIR, &news_dir.display().to_string())
        .await?;
    info!(
        articles = article_count,
        sources = source_count,
        "Catalogue replaced"
    );
    Ok((article_count, source_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, outlet: &str, name: &str, body: &str) {
        let outlet_dir = dir.join(outlet);
        fs::create_dir_all(&outlet_dir).unwrap();
        fs::write(outlet_dir.join(name), body).unwrap();
    }

    #[test]
    fn test_load_articles_walks_outlet_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Wire",
            "12.txt",
            "SOURCE: The Wire\nTITLE: Fire at plant\nPUBLISHED: 2014/01/20\n\nA fire broke out at the plant early this morning.\n",
        );
        write(
            dir.path(),
            "Daily",
            "3.txt",
            "TITLE: No source header\n\nThe council met on Tuesday to discuss the budget at length.\n",
        );
        write(dir.path(), "Daily", "notes.txt", "not an article");

        let articles = load_articles(dir.path()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, 3);
        assert_eq!(articles[0].source, "Daily");
        assert!(articles[0].publish_date.is_none());
        assert_eq!(articles[1].source, "The Wire");
        assert!(articles[1].publish_date.is_some());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A", "1.txt", "SOURCE: Alpha\n\nfirst body text that is long enough to count\n");
        write(dir.path(), "B", "1.txt", "SOURCE: Beta\n\nsecond body text that is long enough to count\n");

        let articles = load_articles(dir.path()).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "Alpha");
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_articles(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_empty_dir_yields_no_articles() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_articles(dir.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_records_ingest_dir() {
        use crate::db::models::LAST_INGEST_AT;
        use crate::db::SqliteDatabase;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Wire", "1.txt", "SOURCE: Wire\n\nSome body text that is long enough here.\n");

        let conn = rusqlite::Connection::open_in_memory().unwrap();
        crate::db::schema::create_tables(&conn).unwrap();
        let db: Arc<dyn Database> = Arc::new(SqliteDatabase::new(conn));

        assert_eq!(run(&db, dir.path()).await.unwrap(), (1, 1));
        assert_eq!(
            db.get_build_state(LAST_INGEST_DIR).await.unwrap(),
            Some(dir.path().display().to_string())
        );
        assert!(db.get_build_state(LAST_INGEST_AT).await.unwrap().is_some());
    }
}
