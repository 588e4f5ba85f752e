//! Node importance via iterative PageRank.
//!
//! # Overview
//!
//! A node is important when many important nodes point at it. On a
//! prerequisite graph, high-rank nodes are the concepts most of the
//! curriculum funnels into.
//!
//! # Algorithm
//!
//! Power iteration on the uniform random-walk matrix:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) / out_degree(u)   for each u → v
//! ```
//!
//! with damping factor `d` (default 0.85). Edge weights do not participate;
//! the walk is uniform over out-edges.
//!
//! # Sinks
//!
//! Rank flowing into a node with no out-edges stays there and is damped
//! away rather than redistributed, so on any graph with sinks the scores
//! sum to less than 1.0. Every non-empty DAG has at least one sink. Rank
//! values are comparable with each other, not probabilities.

use std::collections::HashMap;

use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use strata_core::{EdgeData, NodeData};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parameters for a PageRank run. Mirrors the `[rank]` section of the
/// engine config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankConfig {
    /// Damping factor (probability of following an edge vs teleporting).
    /// Default: 0.85.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Number of power iterations to run. Default: 100.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Optional early stop: finish once the L1 delta between iterations
    /// falls below this. Off by default; the full iteration count runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_iterations() -> usize {
    100
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            iterations: default_iterations(),
            tolerance: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Scores plus how the run finished.
#[derive(Debug, Clone)]
pub struct RankResult {
    /// Node id to rank score.
    pub scores: HashMap<String, f64>,
    /// Iterations actually performed.
    pub iterations: usize,
    /// Whether an early stop fired. Always `false` when no tolerance is
    /// configured.
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Run PageRank over the whole graph.
#[must_use]
#[instrument(skip(graph, config))]
#[allow(clippy::cast_precision_loss)]
pub fn pagerank(graph: &DiGraph<NodeData, EdgeData>, config: &RankConfig) -> RankResult {
    let n = graph.node_count();
    if n == 0 {
        return RankResult {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
        };
    }

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;

    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.neighbors(idx).count())
        .collect();

    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..config.iterations {
        iterations += 1;

        for rank in &mut new_ranks {
            *rank = base;
        }

        // Sink rank is not redistributed; it drains (see module doc).
        for idx in graph.node_indices() {
            let degree = out_degree[idx.index()];
            if degree == 0 {
                continue;
            }
            let share = config.damping * ranks[idx.index()] / degree as f64;
            for next in graph.neighbors(idx) {
                new_ranks[next.index()] += share;
            }
        }

        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if let Some(tolerance) = config.tolerance {
            if delta < tolerance {
                converged = true;
                break;
            }
        }
    }

    let scores = graph
        .node_indices()
        .map(|idx| (graph[idx].id.clone(), ranks[idx.index()]))
        .collect();

    tracing::debug!(iterations, converged, "pagerank finished");
    RankResult {
        scores,
        iterations,
        converged,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
