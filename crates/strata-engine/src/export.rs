//! Serializable snapshot of the graph and summary statistics.
//!
//! # Snapshot shape
//!
//! ```text
//! {
//!   "nodes":    [ { "id", "kind", "attributes", "metadata", "created_at", "updated_at" } ],
//!   "edges":    [ { "source", "target", "relation_kind", "weight" } ],
//!   "metadata": { "node_count", "edge_count", "density", "is_dag" }
//! }
//! ```
//!
//! Edge entries carry exactly those four fields; the edge id (derivable)
//! and edge metadata stay internal. Nodes and edges appear in insertion
//! order and node metadata maps are key-ordered, so a fixed build sequence
//! serializes byte-identically. The snapshot deserializes back for
//! rebuilding through [`crate::engine::Engine::from_snapshot`], which
//! re-checks every invariant on the way in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use strata_core::{GraphStore, NodeData};

use crate::order;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// The full export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
    pub metadata: SnapshotMetadata,
}

/// One node entry: the model fields plus timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    pub id: String,
    pub kind: String,
    pub attributes: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One edge entry. Exactly these four fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: String,
    pub target: String,
    pub relation_kind: String,
    pub weight: f64,
}

/// Whole-graph summary block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub is_dag: bool,
}

impl From<&NodeData> for NodeExport {
    fn from(node: &NodeData) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind.clone(),
            attributes: node.attributes.clone(),
            metadata: node.metadata.clone(),
            created_at: node.created_at,
            updated_at: node.updated_at,
        }
    }
}

impl From<NodeExport> for NodeData {
    fn from(export: NodeExport) -> Self {
        Self {
            id: export.id,
            kind: export.kind,
            attributes: export.attributes,
            metadata: export.metadata,
            created_at: export.created_at,
            updated_at: export.updated_at,
        }
    }
}

impl Snapshot {
    /// Capture the store's current state.
    #[must_use]
    pub fn from_store(store: &GraphStore) -> Self {
        let nodes = store.nodes().map(NodeExport::from).collect();
        let edges = store
            .edges()
            .map(|(source, target, edge)| EdgeExport {
                source: source.to_string(),
                target: target.to_string(),
                relation_kind: edge.relation_kind.clone(),
                weight: edge.weight,
            })
            .collect();
        let metadata = SnapshotMetadata {
            node_count: store.node_count(),
            edge_count: store.edge_count(),
            density: density(store.node_count(), store.edge_count()),
            is_dag: order::is_dag(store.graph()),
        };
        Self {
            nodes,
            edges,
            metadata,
        }
    }

    /// Pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error; with the types used here
    /// serialization itself cannot fail, so this is effectively infallible.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a snapshot back from JSON.
    ///
    /// # Errors
    ///
    /// Fails when the document is not valid JSON in the snapshot shape.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics over the whole graph. The snapshot metadata block is
/// the first four fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// `edge_count / (node_count * (node_count - 1))`; 0.0 below two nodes.
    pub density: f64,
    pub is_dag: bool,
    /// Nodes with no prerequisites.
    pub root_count: usize,
    /// Nodes with no dependents.
    pub leaf_count: usize,
    /// Nodes with no edges at all.
    pub isolated_node_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
}

impl GraphStats {
    /// Compute statistics for the store's current state.
    #[must_use]
    pub fn from_store(store: &GraphStore) -> Self {
        let graph = store.graph();

        let isolated_node_count = graph
            .node_indices()
            .filter(|&idx| {
                graph.neighbors_directed(idx, Direction::Incoming).next().is_none()
                    && graph.neighbors_directed(idx, Direction::Outgoing).next().is_none()
            })
            .count();

        let max_in_degree = graph
            .node_indices()
            .map(|idx| graph.neighbors_directed(idx, Direction::Incoming).count())
            .max()
            .unwrap_or(0);

        let max_out_degree = graph
            .node_indices()
            .map(|idx| graph.neighbors_directed(idx, Direction::Outgoing).count())
            .max()
            .unwrap_or(0);

        Self {
            node_count: store.node_count(),
            edge_count: store.edge_count(),
            density: density(store.node_count(), store.edge_count()),
            is_dag: order::is_dag(graph),
            root_count: store.roots().len(),
            leaf_count: store.leaves().len(),
            isolated_node_count,
            max_in_degree,
            max_out_degree,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
