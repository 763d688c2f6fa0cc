// Node and relation records for one graph query.
//
// Every catalogue source becomes a node (isolated ones included, with zero
// metrics). Nodes are indexed in catalogue order and relations point into
// that same node list by position.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::hits::{hits, HitsConfig};
use super::pagerank::{PageRankConfig, PageRankScorer};
use super::SourceGraph;
use crate::corpus::{SourceCatalogue, SourceId};
use crate::references::SourceAggregation;

/// Per-source metrics, one entry per catalogue source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub id: SourceId,
    pub name: String,
    /// Weighted in-degree
    pub referenced_by_count: u64,
    /// Weighted out-degree
    pub references_to_others_count: u64,
    /// Out minus in
    pub reference_diff: i64,
    pub pagerank: f64,
    pub hits_hub: f64,
    pub hits_auth: f64,
}

impl SourceNode {
    /// Read one metric by selector
    pub fn metric(&self, metric: NodeMetric) -> f64 {
        match metric {
            NodeMetric::ReferencedByCount => self.referenced_by_count as f64,
            NodeMetric::ReferencesToOthersCount => self.references_to_others_count as f64,
            NodeMetric::ReferenceDiff => self.reference_diff as f64,
            NodeMetric::Pagerank => self.pagerank,
            NodeMetric::HitsHub => self.hits_hub,
            NodeMetric::HitsAuth => self.hits_auth,
        }
    }
}

/// Directed edge between two nodes, by position in the node list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRelation {
    pub from_idx: usize,
    pub to_idx: usize,
    pub count: u64,
}

/// Full response for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceGraphReport {
    pub nodes: Vec<SourceNode>,
    pub relations: Vec<SourceRelation>,
}

/// Advisory metric selectors used for node size and color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMetric {
    ReferencedByCount,
    ReferencesToOthersCount,
    ReferenceDiff,
    Pagerank,
    HitsHub,
    HitsAuth,
}

impl NodeMetric {
    pub const ALL: [NodeMetric; 6] = [
        NodeMetric::ReferencedByCount,
        NodeMetric::ReferencesToOthersCount,
        NodeMetric::ReferenceDiff,
        NodeMetric::Pagerank,
        NodeMetric::HitsHub,
        NodeMetric::HitsAuth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeMetric::ReferencedByCount => "referenced_by_count",
            NodeMetric::ReferencesToOthersCount => "references_to_others_count",
            NodeMetric::ReferenceDiff => "reference_diff",
            NodeMetric::Pagerank => "pagerank",
            NodeMetric::HitsHub => "hits_hub",
            NodeMetric::HitsAuth => "hits_auth",
        }
    }
}

impl fmt::Display for NodeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = NodeMetric::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown metric '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Merge degrees and centrality scores into node/relation records.
///
/// Fails if an edge endpoint isn't in the catalogue; the aggregation and
/// catalogue must come from the same snapshot.
pub fn build_report(
    catalogue: &SourceCatalogue,
    aggregation: &SourceAggregation,
    pagerank_config: &PageRankConfig,
    hits_config: HitsConfig,
) -> Result<SourceGraphReport> {
    let graph = SourceGraph::from_edges(&aggregation.edges);
    let pagerank = PageRankScorer::new(pagerank_config.clone()).compute(&graph);
    let hits_scores = hits(&graph, hits_config);

    let mut node_index: BTreeMap<SourceId, usize> = BTreeMap::new();
    let mut nodes = Vec::with_capacity(catalogue.sources().len());

    for source in catalogue.sources() {
        let referenced_by = aggregation.in_degree.get(&source.id).copied().unwrap_or(0);
        let references_to = aggregation.out_degree.get(&source.id).copied().unwrap_or(0);
        let scores = hits_scores.get(&source.id);

        node_index.insert(source.id, nodes.len());
        nodes.push(SourceNode {
            id: source.id,
            name: source.name.clone(),
            referenced_by_count: referenced_by,
            references_to_others_count: references_to,
            reference_diff: references_to as i64 - referenced_by as i64,
            pagerank: pagerank.get(&source.id).copied().unwrap_or(0.0),
            hits_hub: scores.map_or(0.0, |s| s.hub),
            hits_auth: scores.map_or(0.0, |s| s.authority),
        });
    }

    let mut relations = Vec::with_capacity(aggregation.edges.len());
    for edge in &aggregation.edges {
        let (Some(&from_idx), Some(&to_idx)) = (node_index.get(&edge.from), node_index.get(&edge.to))
        else {
            anyhow::bail!(
                "edge {} -> {} names a source missing from the catalogue",
                edge.from,
                edge.to
            );
        };
        relations.push(SourceRelation {
            from_idx,
            to_idx,
            count: edge.count,
        });
    }

    Ok(SourceGraphReport { nodes, relations })
}
