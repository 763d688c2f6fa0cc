// Vectorizer trait: turns articles into dense rows over a shared column space.
//
// TF-IDF is the only implementation. Similarity and inference depend on the
// trait, not on it.

use anyhow::Result;

use super::tfidf::TermMatrix;
use crate::corpus::Article;

/// Trait for turning a corpus of articles into a document-term matrix.
pub trait DocumentVectorizer {
    /// Vectorize the articles. Rows come back ordered by article id.
    fn vectorize(&self, articles: &[Article]) -> Result<TermMatrix>;
}
