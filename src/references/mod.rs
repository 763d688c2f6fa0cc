// References: article-level inference and source-level aggregation.

pub mod inference;
pub mod aggregate;

pub use aggregate::{aggregate_sources, EdgeFilter, SourceAggregation, SourceEdge};
pub use inference::{infer_references, ArticleReference, DEFAULT_SIM_THRESHOLD};
