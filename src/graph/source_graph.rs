// Weighted directed graph over outlets.
//
// Built from the retained source edges of one query; nodes are exactly the
// edge endpoints, in ascending source id order.

use std::collections::BTreeMap;

use crate::corpus::SourceId;
use crate::references::SourceEdge;

/// Weighted adjacency over dense node indices
#[derive(Debug, Clone, Default)]
pub struct SourceGraph {
    /// Index -> source id
    nodes: Vec<SourceId>,

    /// Adjacency list: node -> (successor, weight)
    outgoing: Vec<Vec<(usize, f64)>>,

    /// Reverse adjacency: node -> (predecessor, weight)
    incoming: Vec<Vec<(usize, f64)>>,
}

impl SourceGraph {
    /// Build the graph from aggregated edges (weight = reference count).
    ///
    /// Parallel edges for the same pair are merged by summing weights.
    pub fn from_edges(edges: &[SourceEdge]) -> Self {
        let mut weights: BTreeMap<(SourceId, SourceId), f64> = BTreeMap::new();
        for edge in edges {
            *weights.entry((edge.from, edge.to)).or_insert(0.0) += edge.count as f64;
        }

        let mut index = BTreeMap::new();
        for &(from, to) in weights.keys() {
            index.entry(from).or_insert(0);
            index.entry(to).or_insert(0);
        }
        let nodes: Vec<SourceId> = index.keys().copied().collect();
        for (i, id) in nodes.iter().enumerate() {
            index.insert(*id, i);
        }

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for ((from, to), weight) in weights {
            let (u, v) = (index[&from], index[&to]);
            outgoing[u].push((v, weight));
            incoming[v].push((u, weight));
        }

        Self {
            nodes,
            outgoing,
            incoming,
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source id at a node index
    pub fn source_id(&self, idx: usize) -> SourceId {
        self.nodes[idx]
    }

    /// Weighted successors of a node
    pub fn successors(&self, idx: usize) -> &[(usize, f64)] {
        &self.outgoing[idx]
    }

    /// Weighted predecessors of a node
    pub fn predecessors(&self, idx: usize) -> &[(usize, f64)] {
        &self.incoming[idx]
    }

    /// Sum of outgoing edge weights
    pub fn out_weight(&self, idx: usize) -> f64 {
        self.outgoing[idx].iter().map(|(_, w)| w).sum()
    }
}
