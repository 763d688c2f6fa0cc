// HITS hub and authority scores.
//
// Authorities are outlets that many good hubs reference; hubs are outlets
// that reference many good authorities:
//
//   auth(v) = Σ_{u→v} w(u,v) · hub(u)
//   hub(u)  = Σ_{u→v} w(u,v) · auth(v)
//
// Each round rescales both vectors by their maximum; the final scores are
// rescaled to sum to 1 when `normalized` is set.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::SourceGraph;
use crate::corpus::SourceId;

/// Configuration for HITS.
#[derive(Debug, Clone, Copy)]
pub struct HitsConfig {
    /// Maximum iterations.
    pub max_iterations: usize,
    /// Convergence tolerance on the L1 change of the hub vector.
    pub tolerance: f64,
    /// Normalize scores to sum to 1.
    pub normalized: bool,
}

impl Default for HitsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-8,
            normalized: true,
        }
    }
}

/// HITS scores for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitsScores {
    pub hub: f64,
    pub authority: f64,
}

/// Compute HITS scores for every node in the graph.
///
/// Terminates after at most `max_iterations` rounds and returns the best
/// estimate reached. Empty graph -> empty map.
pub fn hits(graph: &SourceGraph, config: HitsConfig) -> BTreeMap<SourceId, HitsScores> {
    let n = graph.node_count();
    if n == 0 {
        return BTreeMap::new();
    }

    let mut hub = vec![1.0 / n as f64; n];
    let mut auth = vec![0.0; n];
    let mut converged = false;
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        iterations += 1;

        let mut new_auth: Vec<f64> = (0..n)
            .map(|v| {
                graph
                    .predecessors(v)
                    .iter()
                    .map(|&(u, weight)| hub[u] * weight)
                    .sum()
            })
            .collect();

        let mut new_hub = vec![0.0; n];
        for (u, slot) in new_hub.iter_mut().enumerate() {
            for &(v, weight) in graph.successors(u) {
                *slot += new_auth[v] * weight;
            }
        }

        scale_by_max(&mut new_hub);
        scale_by_max(&mut new_auth);

        let diff: f64 = new_hub.iter().zip(&hub).map(|(a, b)| (a - b).abs()).sum();
        hub = new_hub;
        auth = new_auth;

        if diff < config.tolerance {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(iterations, nodes = n, "HITS converged");
    } else {
        warn!(iterations, nodes = n, "HITS hit the iteration cap, using last estimate");
    }

    if config.normalized {
        scale_by_sum(&mut hub);
        scale_by_sum(&mut auth);
    }

    (0..n)
        .map(|i| {
            (
                graph.source_id(i),
                HitsScores {
                    hub: hub[i],
                    authority: auth[i],
                },
            )
        })
        .collect()
}

fn scale_by_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(0.0f64, f64::max);
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

fn scale_by_sum(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}
