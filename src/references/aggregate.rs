// Source aggregation: collapse article references into outlet-level edges.
//
// References are grouped by (source(from), source(to)). Pairs within the
// same outlet are dropped, the rest are re-filtered by the per-query
// similarity threshold, counted, and groups below the minimum count are
// discarded. Degrees are weighted by edge count, not by edge.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::inference::ArticleReference;
use crate::corpus::{SourceCatalogue, SourceId};

/// Per-query filters applied on top of the stored reference set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFilter {
    /// Keep references with similarity >= this value
    pub similarity_threshold: f64,
    /// Keep source edges whose aggregated count >= this value
    pub min_edge_count: u64,
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            min_edge_count: 1,
        }
    }
}

/// A directed, counted edge between two outlets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEdge {
    pub from: SourceId,
    pub to: SourceId,
    pub count: u64,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct SourceAggregation {
    /// Retained edges, ordered by (from, to)
    pub edges: Vec<SourceEdge>,
    /// Weighted in-degree per source (only sources touched by an edge)
    pub in_degree: BTreeMap<SourceId, u64>,
    /// Weighted out-degree per source (only sources touched by an edge)
    pub out_degree: BTreeMap<SourceId, u64>,
}

/// Aggregate article references into source edges.
///
/// Every reference must name articles known to the catalogue; an unknown
/// article means the reference set and catalogue are out of sync, which is
/// reported as an error.
pub fn aggregate_sources(
    references: &[ArticleReference],
    catalogue: &SourceCatalogue,
    filter: &EdgeFilter,
) -> Result<SourceAggregation> {
    let mut counts: BTreeMap<(SourceId, SourceId), u64> = BTreeMap::new();

    for reference in references {
        let from = catalogue
            .source_of(reference.from_id)
            .with_context(|| format!("reference from unknown article {}", reference.from_id))?;
        let to = catalogue
            .source_of(reference.to_id)
            .with_context(|| format!("reference to unknown article {}", reference.to_id))?;

        if from == to || reference.similarity < filter.similarity_threshold {
            continue;
        }
        *counts.entry((from, to)).or_insert(0) += 1;
    }

    let mut aggregation = SourceAggregation::default();
    for ((from, to), count) in counts {
        if count < filter.min_edge_count {
            continue;
        }
        *aggregation.out_degree.entry(from).or_insert(0) += count;
        *aggregation.in_degree.entry(to).or_insert(0) += count;
        aggregation.edges.push(SourceEdge { from, to, count });
    }

    debug!(
        references = references.len(),
        edges = aggregation.edges.len(),
        similarity_threshold = filter.similarity_threshold,
        min_edge_count = filter.min_edge_count,
        "Aggregated source edges"
    );

    Ok(aggregation)
}
