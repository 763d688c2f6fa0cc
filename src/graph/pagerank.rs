// Weighted PageRank over the source graph.
//
// Rank flows along each edge in proportion to its weight share of the
// source node's total out-weight. Dangling nodes (no outgoing edges) spread
// their rank uniformly over every node, so the scores always sum to 1.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::SourceGraph;
use crate::corpus::SourceId;

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (typically 0.85)
    pub damping: f64,

    /// Maximum iterations
    pub max_iterations: usize,

    /// Convergence threshold per node; the iteration stops once the L1
    /// change of the whole vector drops below `node_count * tolerance`
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// PageRank scorer for sources
pub struct PageRankScorer {
    config: PageRankConfig,
}

impl PageRankScorer {
    /// Create a new scorer
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// Compute PageRank for every node in the graph.
    ///
    /// An empty graph gives an empty map. If the iteration cap is hit before
    /// convergence the last estimate is returned.
    pub fn compute(&self, graph: &SourceGraph) -> BTreeMap<SourceId, f64> {
        let n = graph.node_count();
        if n == 0 {
            return BTreeMap::new();
        }

        let n_f64 = n as f64;
        let damping = self.config.damping;
        let out_weights: Vec<f64> = (0..n).map(|i| graph.out_weight(i)).collect();

        let mut scores = vec![1.0 / n_f64; n];
        let mut converged = false;
        let mut iterations = 0;

        for _ in 0..self.config.max_iterations {
            iterations += 1;

            let dangling: f64 = (0..n)
                .filter(|&i| out_weights[i] == 0.0)
                .map(|i| scores[i])
                .sum();
            let base = (1.0 - damping) / n_f64 + damping * dangling / n_f64;

            let mut next = vec![base; n];
            for (u, &out_weight) in out_weights.iter().enumerate() {
                if out_weight == 0.0 {
                    continue;
                }
                for &(v, weight) in graph.successors(u) {
                    next[v] += damping * scores[u] * weight / out_weight;
                }
            }

            let diff: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
            scores = next;

            if diff < n_f64 * self.config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(iterations, nodes = n, "PageRank converged");
        } else {
            warn!(
                iterations,
                nodes = n,
                "PageRank hit the iteration cap, using last estimate"
            );
        }

        scores
            .into_iter()
            .enumerate()
            .map(|(i, score)| (graph.source_id(i), score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::SourceEdge;

    fn edge(from: SourceId, to: SourceId, count: u64) -> SourceEdge {
        SourceEdge { from, to, count }
    }

    #[test]
    fn test_pagerank_basic() {
        // A -> B -> C, D -> B: B collects the most rank among A, B, D
        let graph = SourceGraph::from_edges(&[edge(1, 2, 1), edge(2, 3, 1), edge(4, 2, 1)]);
        let scores = PageRankScorer::new(PageRankConfig::default()).compute(&graph);

        assert!(scores[&2] > scores[&1], "B should rank higher than A");
        assert!(scores[&2] > scores[&4], "B should rank higher than D");

        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6, "scores sum to {total}");
    }

    #[test]
    fn test_pagerank_single_edge() {
        let graph = SourceGraph::from_edges(&[edge(0, 1, 1)]);
        let scores = PageRankScorer::new(PageRankConfig::default()).compute(&graph);
        assert!(scores[&1] > scores[&0]);
        assert!(scores[&0] > 0.0);
    }

    #[test]
    fn test_pagerank_uses_weights() {
        // 0 splits its rank 9:1 between 1 and 2
        let graph = SourceGraph::from_edges(&[edge(0, 1, 9), edge(0, 2, 1)]);
        let scores = PageRankScorer::new(PageRankConfig::default()).compute(&graph);
        assert!(scores[&1] > scores[&2]);
    }

    #[test]
    fn test_pagerank_cap_returns_estimate() {
        let graph = SourceGraph::from_edges(&[edge(0, 1, 1), edge(1, 0, 1), edge(1, 2, 3)]);
        let config = PageRankConfig {
            max_iterations: 1,
            ..PageRankConfig::default()
        };
        let scores = PageRankScorer::new(config).compute(&graph);
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn test_pagerank_empty_graph() {
        let graph = SourceGraph::from_edges(&[]);
        let scores = PageRankScorer::new(PageRankConfig::default()).compute(&graph);
        assert!(scores.is_empty());
    }
}
