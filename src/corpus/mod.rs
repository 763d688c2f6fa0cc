// Corpus: articles, outlets, and the raw-file parser that produces them.

pub mod article;
pub mod parse;

pub use article::{Article, ArticleId, Source, SourceCatalogue, SourceId};
