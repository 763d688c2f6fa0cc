// Source graph and centrality metrics.
//
// PageRank and HITS over the weighted outlet graph, merged with the
// degree counts into the per-query report.

mod source_graph;
pub mod hits;
pub mod pagerank;
pub mod report;

pub use hits::{hits, HitsConfig, HitsScores};
pub use pagerank::{PageRankConfig, PageRankScorer};
pub use report::{build_report, NodeMetric, SourceGraphReport, SourceNode, SourceRelation};
pub use source_graph::SourceGraph;
