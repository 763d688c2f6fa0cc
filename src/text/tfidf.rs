// TF-IDF document vectorizer.
//
// Each article is one document. Term frequency is the raw count normalized
// by document length; inverse document frequency is
//
//   idf(t) = ln(n_docs / (doc_count(t) + epsilon))
//
// With this variant a term present in every document gets a slightly
// negative IDF (ln(n / (n + eps)) < 0). It is not clamped.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use tracing::{debug, info};

use super::tokenize::tokenize;
use super::traits::DocumentVectorizer;
use crate::corpus::{Article, ArticleId};

/// Dense document-term matrix plus the mappings needed downstream.
#[derive(Debug, Clone, Default)]
pub struct TermMatrix {
    /// Row position -> article id (ascending)
    pub article_ids: Vec<ArticleId>,
    /// Column position -> term (sorted)
    pub vocabulary: Vec<String>,
    /// Length-normalized term frequencies, `[row][column]`
    pub term_frequencies: Vec<Vec<f64>>,
    /// Per-column inverse document frequency
    pub idf: Vec<f64>,
    /// TF × IDF, `[row][column]`
    pub weights: Vec<Vec<f64>>,
}

impl TermMatrix {
    pub fn document_count(&self) -> usize {
        self.article_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.article_ids.is_empty()
    }

    /// Column position of a term, if it's in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
    }
}

/// TF-IDF vectorizer, the default for reference inference.
pub struct TfIdfVectorizer {
    /// Added to document counts so the IDF denominator is never zero
    pub epsilon: f64,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self { epsilon: 1e-10 }
    }
}

impl DocumentVectorizer for TfIdfVectorizer {
    fn vectorize(&self, articles: &[Article]) -> Result<TermMatrix> {
        if articles.is_empty() {
            return Ok(TermMatrix::default());
        }

        let mut ordered: Vec<&Article> = articles.iter().collect();
        ordered.sort_by_key(|a| a.id);
        for pair in ordered.windows(2) {
            anyhow::ensure!(
                pair[0].id != pair[1].id,
                "duplicate article id {} in corpus",
                pair[0].id
            );
        }

        let documents: Vec<Vec<String>> = ordered.iter().map(|a| tokenize(&a.content)).collect();

        let vocabulary: Vec<String> = documents
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let column: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let term_frequencies: Vec<Vec<f64>> = documents
            .iter()
            .map(|tokens| term_frequency_row(tokens, &column, vocabulary.len()))
            .collect();

        let idf = inverse_document_frequency(&term_frequencies, vocabulary.len(), self.epsilon);

        let weights: Vec<Vec<f64>> = term_frequencies
            .iter()
            .map(|row| row.iter().zip(&idf).map(|(tf, idf)| tf * idf).collect())
            .collect();

        let empty_docs = documents.iter().filter(|d| d.is_empty()).count();
        if empty_docs > 0 {
            debug!(empty_docs, "Documents with no tokens get all-zero rows");
        }

        info!(
            documents = ordered.len(),
            vocabulary = vocabulary.len(),
            "Built TF-IDF matrix"
        );

        Ok(TermMatrix {
            article_ids: ordered.iter().map(|a| a.id).collect(),
            vocabulary,
            term_frequencies,
            idf,
            weights,
        })
    }
}

/// Raw counts divided by document length. An empty document is all zeros.
fn term_frequency_row(tokens: &[String], column: &HashMap<&str, usize>, width: usize) -> Vec<f64> {
    let mut row = vec![0.0; width];
    if tokens.is_empty() {
        return row;
    }

    for token in tokens {
        row[column[token.as_str()]] += 1.0;
    }

    let len = tokens.len() as f64;
    for value in &mut row {
        *value /= len;
    }
    row
}

fn inverse_document_frequency(tf: &[Vec<f64>], width: usize, epsilon: f64) -> Vec<f64> {
    let n_docs = tf.len() as f64;
    let mut doc_count = vec![0usize; width];
    for row in tf {
        for (count, value) in doc_count.iter_mut().zip(row) {
            if *value > 0.0 {
                *count += 1;
            }
        }
    }

    doc_count
        .into_iter()
        .map(|df| (n_docs / (df as f64 + epsilon)).ln())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: ArticleId, content: &str) -> Article {
        Article {
            id,
            source: "S".to_string(),
            title: String::new(),
            author: String::new(),
            publish_date: None,
            location: String::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_vectorize_basic() {
        let articles = vec![article(2, "apple banana"), article(1, "apple apple cherry")];
        let matrix = TfIdfVectorizer::default().vectorize(&articles).unwrap();

        assert_eq!(matrix.article_ids, vec![1, 2]);
        assert_eq!(matrix.vocabulary, vec!["apple", "banana", "cherry"]);

        let apple = matrix.term_index("apple").unwrap();
        let cherry = matrix.term_index("cherry").unwrap();
        assert!((matrix.term_frequencies[0][apple] - 2.0 / 3.0).abs() < 1e-12);
        assert!((matrix.term_frequencies[0][cherry] - 1.0 / 3.0).abs() < 1e-12);

        // cherry appears in 1 of 2 documents
        assert!((matrix.idf[cherry] - (2.0f64 / (1.0 + 1e-10)).ln()).abs() < 1e-9);
    }

    #[test]
    fn test_term_in_every_document_has_negative_idf() {
        let articles = vec![article(1, "common alpha"), article(2, "common beta")];
        let matrix = TfIdfVectorizer::default().vectorize(&articles).unwrap();
        let common = matrix.term_index("common").unwrap();
        assert!(matrix.idf[common] < 0.0, "idf = {}", matrix.idf[common]);
        assert!(matrix.weights[0][common] < 0.0);
    }

    #[test]
    fn test_empty_document_row_is_zero() {
        let articles = vec![article(1, "words here"), article(2, "  ...  ")];
        let matrix = TfIdfVectorizer::default().vectorize(&articles).unwrap();
        assert!(matrix.term_frequencies[1].iter().all(|v| *v == 0.0));
        assert!(matrix.weights[1].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_corpus() {
        let matrix = TfIdfVectorizer::default().vectorize(&[]).unwrap();
        assert!(matrix.is_empty());
        assert!(matrix.vocabulary.is_empty());
        assert!(matrix.weights.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let articles = vec![article(1, "a"), article(1, "b")];
        assert!(TfIdfVectorizer::default().vectorize(&articles).is_err());
    }
}
