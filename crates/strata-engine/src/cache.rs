//! Derived-result caches and their invalidation lifecycle.
//!
//! # Lifecycle
//!
//! Every derived result (topological order, transitive closure, PageRank
//! scores, BFS paths) is computed lazily on first use and parked here.
//! A structural mutation drops all of them as a unit; there is no partial
//! invalidation. The version counter ticks once per invalidation so
//! embedders can tell "same answer because nothing changed" from "same
//! answer recomputed".

use std::collections::HashMap;

use crate::closure::ClosureMatrix;

/// Cache slots for everything derivable from the graph.
#[derive(Debug, Clone, Default)]
pub struct CacheManager {
    version: u64,
    topo: Option<Vec<String>>,
    closure: Option<ClosureMatrix>,
    ranks: Option<HashMap<String, f64>>,
    paths: HashMap<(String, String), Vec<String>>,
}

impl CacheManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invalidations so far.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Drop every cached result and tick the version.
    pub fn invalidate_all(&mut self) {
        self.topo = None;
        self.closure = None;
        self.ranks = None;
        self.paths.clear();
        self.version += 1;
        tracing::debug!(version = self.version, "derived caches invalidated");
    }

    /// Cached topological order, computing it on a cold slot.
    pub fn topo_or_insert_with<F>(&mut self, compute: F) -> &[String]
    where
        F: FnOnce() -> Vec<String>,
    {
        self.topo.get_or_insert_with(compute)
    }

    /// Cached closure matrix, computing it on a cold slot.
    pub fn closure_or_insert_with<F>(&mut self, compute: F) -> &ClosureMatrix
    where
        F: FnOnce() -> ClosureMatrix,
    {
        self.closure.get_or_insert_with(compute)
    }

    /// Cached PageRank scores, computing them on a cold slot.
    pub fn ranks_or_insert_with<F>(&mut self, compute: F) -> &HashMap<String, f64>
    where
        F: FnOnce() -> HashMap<String, f64>,
    {
        self.ranks.get_or_insert_with(compute)
    }

    /// Cached path for `(start, goal)`, computing it on a cold entry.
    pub fn path_or_insert_with<F>(&mut self, start: &str, goal: &str, compute: F) -> &[String]
    where
        F: FnOnce() -> Vec<String>,
    {
        self.paths
            .entry((start.to_string(), goal.to_string()))
            .or_insert_with(compute)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
