//! The graph store: index-based node/edge ownership with cycle-safe
//! insertion.
//!
//! # Overview
//!
//! [`GraphStore`] holds node payloads in a `petgraph` directed graph and
//! resolves string ids through a side map, so traversals run on dense
//! integer indexes and string hashing happens once per call at the API
//! boundary. Forward (dependents) and reverse (prerequisites) adjacency are
//! two directional views over the same edge list, which keeps them
//! symmetric by construction.
//!
//! # Invariants
//!
//! - Node ids are unique and non-empty; identity never changes.
//! - Edge weights are finite and positive.
//! - No self-loops, no duplicate `(source, target)` pairs, no cycles.
//! - A failed insertion commits nothing.
//!
//! Insertion is the only mutation path; there is no deletion API.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::cycles::would_create_cycle;
use crate::error::{GraphError, Result};
use crate::model::{EdgeData, NodeData};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a successful `add_node` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    /// A new node was created. Graph structure changed.
    Inserted,
    /// An existing node absorbed the payload. Structure unchanged.
    Merged,
}

/// What a successful `add_edge` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// A new edge was created.
    Inserted,
    /// An existing `(source, target)` edge had its payload replaced.
    Updated,
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

/// Owner of all nodes, edges, and adjacency state.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: DiGraph<NodeData, EdgeData>,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert a node, or merge the payload into an existing node with the
    /// same id (attributes unioned, `kind`/metadata last-write-wins).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyNodeId`] if the id is empty. Nothing else
    /// fails; duplicate ids merge by design.
    pub fn add_node(&mut self, node: NodeData) -> Result<NodeOutcome> {
        if node.id.is_empty() {
            return Err(GraphError::EmptyNodeId);
        }

        if let Some(&idx) = self.node_map.get(&node.id) {
            self.graph[idx].merge_from(node);
            return Ok(NodeOutcome::Merged);
        }

        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_map.insert(id, idx);
        tracing::trace!(id = self.graph[idx].id.as_str(), "node inserted");
        Ok(NodeOutcome::Inserted)
    }

    /// Insert a directed edge `source -> target`, or update the payload of
    /// an existing one.
    ///
    /// Validation runs before any index mutation, in this order: self-loop,
    /// weight, endpoint existence, duplicate pair (updated in place without
    /// a cycle check), cycle guard. A rejected edge leaves the store
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`GraphError::SelfLoop`] when `source == target`.
    /// - [`GraphError::InvalidWeight`] when the weight is not finite and
    ///   positive.
    /// - [`GraphError::NodeNotFound`] when either endpoint is absent.
    /// - [`GraphError::CycleDetected`] when the edge would close a cycle;
    ///   the error carries the offending path.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        relation_kind: &str,
        weight: f64,
    ) -> Result<EdgeOutcome> {
        if source == target {
            return Err(GraphError::SelfLoop {
                id: source.to_string(),
            });
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GraphError::InvalidWeight {
                source: source.to_string(),
                target: target.to_string(),
                weight,
            });
        }

        let source_idx = self.require(source)?;
        let target_idx = self.require(target)?;

        // An existing pair cannot create a new cycle; replace its payload.
        if let Some(edge_idx) = self.graph.find_edge(source_idx, target_idx) {
            self.graph[edge_idx] = EdgeData::new(source, target, relation_kind, weight);
            tracing::trace!(source, target, weight, "edge payload updated");
            return Ok(EdgeOutcome::Updated);
        }

        if let Some(path) = would_create_cycle(&self.graph, source_idx, target_idx) {
            return Err(GraphError::CycleDetected {
                source: source.to_string(),
                target: target.to_string(),
                path,
            });
        }

        self.graph.add_edge(
            source_idx,
            target_idx,
            EdgeData::new(source, target, relation_kind, weight),
        );
        tracing::trace!(source, target, weight, "edge inserted");
        Ok(EdgeOutcome::Inserted)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Fetch a node payload by id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown id.
    pub fn get_node(&self, id: &str) -> Result<&NodeData> {
        self.require(id).map(|idx| &self.graph[idx])
    }

    /// O(1) membership test.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Fetch an edge payload by endpoints, if the pair is linked.
    #[must_use]
    pub fn get_edge(&self, source: &str, target: &str) -> Option<&EdgeData> {
        let source_idx = *self.node_map.get(source)?;
        let target_idx = *self.node_map.get(target)?;
        let edge_idx = self.graph.find_edge(source_idx, target_idx)?;
        self.graph.edge_weight(edge_idx)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node payloads in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph.node_weights()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|node| node.id.as_str())
    }

    /// Edges in insertion order, as `(source id, target id, payload)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeData)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].id.as_str(),
                self.graph[edge.target()].id.as_str(),
                edge.weight(),
            )
        })
    }

    // -----------------------------------------------------------------------
    // Direct adjacency
    // -----------------------------------------------------------------------

    /// Direct prerequisites of `id` (reverse adjacency).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown id.
    pub fn prerequisites_of(&self, id: &str) -> Result<HashSet<String>> {
        let idx = self.require(id)?;
        Ok(self.neighbor_ids(idx, Direction::Incoming))
    }

    /// Direct dependents of `id` (forward adjacency).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown id.
    pub fn dependents_of(&self, id: &str) -> Result<HashSet<String>> {
        let idx = self.require(id)?;
        Ok(self.neighbor_ids(idx, Direction::Outgoing))
    }

    /// Nodes with no prerequisites, in insertion order.
    #[must_use]
    pub fn roots(&self) -> Vec<String> {
        self.degree_filtered(Direction::Incoming)
    }

    /// Nodes with no dependents, in insertion order.
    #[must_use]
    pub fn leaves(&self) -> Vec<String> {
        self.degree_filtered(Direction::Outgoing)
    }

    // -----------------------------------------------------------------------
    // Index-level access (for the algorithm layer)
    // -----------------------------------------------------------------------

    /// Read-only view of the underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &DiGraph<NodeData, EdgeData> {
        &self.graph
    }

    /// Dense index for an id, if present.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Id for a dense index, if present.
    #[must_use]
    pub fn id_of(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|node| node.id.as_str())
    }

    // -----------------------------------------------------------------------
    // Fingerprinting
    // -----------------------------------------------------------------------

    /// Content hash over nodes and edge payloads, prefixed `blake3:`.
    ///
    /// Line-oriented and sorted, so two stores holding the same nodes and
    /// edges hash identically regardless of insertion order. Weight and
    /// relation kind participate: a payload update changes the hash.
    /// Embedders holding derived results outside the engine can use this as
    /// a freshness key.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut lines: Vec<String> = self
            .graph
            .node_weights()
            .map(|node| format!("n|{}", node.id))
            .collect();
        lines.extend(self.edges().map(|(source, target, edge)| {
            format!("e|{source}->{target}|{}|{}", edge.relation_kind, edge.weight)
        }));
        lines.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn require(&self, id: &str) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    }

    fn neighbor_ids(&self, idx: NodeIndex, direction: Direction) -> HashSet<String> {
        self.graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].id.clone())
            .collect()
    }

    fn degree_filtered(&self, direction: Direction) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_directed(idx, direction).next().is_none())
            .map(|idx| self.graph[idx].id.clone())
            .collect()
    }
}
