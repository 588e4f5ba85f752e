//! Transitive closure of the prerequisite relation.
//!
//! # Overview
//!
//! Answers "everything `v` depends on, at any distance" and its inverse
//! "everything that depends on `v`" from one precomputed structure. One
//! bitset row per node holds that node's full ancestor set; the descendant
//! query is the column scan of the same matrix.
//!
//! # Algorithm
//!
//! Warshall's closure on bitset rows, seeded from the reverse adjacency:
//!
//! 1. `rows[i]` starts as the direct predecessors of `i`.
//! 2. For each pivot `k`: every row that contains `k` absorbs `rows[k]`.
//!
//! O(V³ / word-size) time, O(V²) bits. Build once, answer any number of
//! reachability queries in O(V / word-size).

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use strata_core::{EdgeData, NodeData};

/// Ancestor matrix: `rows[i]` contains bit `j` iff `j` is a transitive
/// prerequisite of `i`.
///
/// Row/column positions are dense [`NodeIndex`] values of the graph the
/// matrix was built from; queries with indexes from any other graph are
/// meaningless.
#[derive(Debug, Clone)]
pub struct ClosureMatrix {
    rows: Vec<FixedBitSet>,
}

impl ClosureMatrix {
    /// Build the full closure for `graph`.
    #[must_use]
    pub fn build(graph: &DiGraph<NodeData, EdgeData>) -> Self {
        let n = graph.node_count();
        let mut rows: Vec<FixedBitSet> = graph
            .node_indices()
            .map(|idx| {
                let mut row = FixedBitSet::with_capacity(n);
                for pred in graph.neighbors_directed(idx, Direction::Incoming) {
                    row.insert(pred.index());
                }
                row
            })
            .collect();

        for k in 0..n {
            let pivot = rows[k].clone();
            for (i, row) in rows.iter_mut().enumerate() {
                if i != k && row.contains(k) {
                    row.union_with(&pivot);
                }
            }
        }

        Self { rows }
    }

    /// Whether `ancestor` is a transitive prerequisite of `of`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeIndex, of: NodeIndex) -> bool {
        self.rows[of.index()].contains(ancestor.index())
    }

    /// All transitive prerequisites of `idx` (row scan).
    pub fn ancestors_of(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.rows[idx.index()].ones().map(NodeIndex::new)
    }

    /// All transitive dependents of `idx` (column scan).
    pub fn descendants_of(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let column = idx.index();
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(i, row)| row.contains(column).then_some(NodeIndex::new(i)))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
