// Reference inference: which articles textually reuse earlier ones.
//
// For every ordered pair (i, j), i != j, article i is taken to reference
// article j when
//
//   sim(i, j) > threshold  AND  publish_date[i] > publish_date[j]
//
// A citation can't precede its source, so the edge always points from the
// later article to the earlier one. Same-day pairs produce no edge, and
// undated articles never participate.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::ArticleId;
use crate::text::similarity::SimilarityMatrix;

/// Default similarity cut-off for storing a reference.
pub const DEFAULT_SIM_THRESHOLD: f64 = 0.5;

/// A directed article-to-article reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleReference {
    /// The later, referencing article
    pub from_id: ArticleId,
    /// The earlier, referenced article
    pub to_id: ArticleId,
    pub similarity: f64,
}

/// Derive the reference relation from a similarity matrix.
///
/// `ids` and `dates` must be in the matrix's row order. A length mismatch is
/// an error.
pub fn infer_references(
    similarity: &SimilarityMatrix,
    ids: &[ArticleId],
    dates: &[Option<NaiveDate>],
    threshold: f64,
) -> Result<Vec<ArticleReference>> {
    let n = similarity.len();
    anyhow::ensure!(
        ids.len() == n && dates.len() == n,
        "shape mismatch: similarity matrix is {n}x{n} but got {} ids and {} dates",
        ids.len(),
        dates.len()
    );

    let mut references = Vec::new();
    for i in 0..n {
        let Some(date_i) = dates[i] else { continue };
        for j in 0..n {
            if i == j {
                continue;
            }
            let Some(date_j) = dates[j] else { continue };

            let sim = similarity.get(i, j);
            if sim > threshold && date_i > date_j {
                references.push(ArticleReference {
                    from_id: ids[i],
                    to_id: ids[j],
                    similarity: sim,
                });
            }
        }
    }

    info!(
        articles = n,
        references = references.len(),
        threshold,
        "Inferred article references"
    );

    Ok(references)
}
