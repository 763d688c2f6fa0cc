// Rebuild pipeline: catalogue → TF-IDF → similarity → stored references.
//
// This is the expensive batch step (quadratic in the article count). It runs
// on a blocking thread so the async store handle stays responsive, and the
// result replaces the stored reference set in one transaction.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::corpus::Article;
use crate::db::Database;
use crate::references::{infer_references, ArticleReference};
use crate::text::similarity::cosine_similarity_matrix;
use crate::text::tfidf::TfIdfVectorizer;
use crate::text::traits::DocumentVectorizer;

/// Infer the full reference set for a corpus.
///
/// The vectorizer decides row order (ascending id for TF-IDF); dates are
/// realigned to that order by id before inference.
pub fn infer_references_from_articles(
    articles: &[Article],
    vectorizer: &dyn DocumentVectorizer,
    sim_threshold: f64,
) -> Result<Vec<ArticleReference>> {
    let matrix = vectorizer.vectorize(articles)?;
    if matrix.is_empty() {
        return Ok(Vec::new());
    }

    let dates_by_id: std::collections::HashMap<_, _> =
        articles.iter().map(|a| (a.id, a.publish_date)).collect();
    let dates = matrix
        .article_ids
        .iter()
        .map(|id| {
            dates_by_id
                .get(id)
                .copied()
                .with_context(|| format!("vectorizer returned unknown article {id}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let similarity = cosine_similarity_matrix(&matrix.weights);
    infer_references(&similarity, &matrix.article_ids, &dates, sim_threshold)
}

/// Recompute and store the reference set from the stored catalogue.
///
/// Returns (articles considered, references stored).
pub async fn run(db: &Arc<dyn Database>, sim_threshold: f64) -> Result<(usize, usize)> {
    anyhow::ensure!(
        sim_threshold.is_finite() && (0.0..=1.0).contains(&sim_threshold),
        "similarity threshold must be within [0, 1], got {sim_threshold}"
    );

    let articles = db.get_articles().await?;
    let article_count = articles.len();
    info!(articles = article_count, sim_threshold, "Rebuilding reference set");

    let references = tokio::task::spawn_blocking(move || {
        infer_references_from_articles(&articles, &TfIdfVectorizer::default(), sim_threshold)
    })
    .await
    .context("Reference rebuild task panicked")??;

    db.replace_references(&references, sim_threshold).await?;
    info!(references = references.len(), "Reference set stored");

    Ok((article_count, references.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(id: i64, source: &str, day: u32, content: &str) -> Article {
        Article {
            id,
            source: source.to_string(),
            title: String::new(),
            author: String::new(),
            publish_date: NaiveDate::from_ymd_opt(2014, 1, day),
            location: String::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_copied_story_references_original() {
        let articles = vec![
            article(1, "Wire", 1, "protesters gathered outside the gas plant demanding answers"),
            article(2, "Daily", 2, "protesters gathered outside the gas plant demanding answers today"),
            article(3, "Daily", 3, "the football club announced a new coach for the season"),
        ];
        let refs =
            infer_references_from_articles(&articles, &TfIdfVectorizer::default(), 0.5).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!((refs[0].from_id, refs[0].to_id), (2, 1));
        assert!(refs[0].similarity > 0.5);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = article(1, "Wire", 1, "kidnapping reported near the company headquarters");
        let b = article(2, "Daily", 2, "kidnapping reported near the company headquarters again");
        let c = article(3, "Post", 3, "weather stays mild all week");
        let vectorizer = TfIdfVectorizer::default();
        let forward =
            infer_references_from_articles(&[a.clone(), b.clone(), c.clone()], &vectorizer, 0.3)
                .unwrap();
        let backward = infer_references_from_articles(&[c, b, a], &vectorizer, 0.3).unwrap();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_corpus_has_no_references() {
        let refs = infer_references_from_articles(&[], &TfIdfVectorizer::default(), 0.5).unwrap();
        assert!(refs.is_empty());
    }
}
