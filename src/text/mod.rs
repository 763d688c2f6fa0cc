// Text analytics: tokenization, TF-IDF vectors, and cosine similarity.

pub mod traits;
pub mod tokenize;
pub mod tfidf;
pub mod similarity;
