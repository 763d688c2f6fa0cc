// refgraph: inferred cross-outlet reference graph for news corpora
//
// This is the library root. Each module corresponds to a stage of the
// pipeline: parse the corpus, vectorize and compare articles, infer and
// aggregate references, then score the resulting source graph.

pub mod config;
pub mod corpus;
pub mod db;
pub mod graph;
pub mod graphfile;
pub mod output;
pub mod pipeline;
pub mod references;
pub mod sentiment;
pub mod status;
pub mod text;
