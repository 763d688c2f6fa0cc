// Pipelines for the three stages the CLI drives: ingest, build, query.

pub mod build;
pub mod ingest;
pub mod query;

pub use query::GraphQuery;
