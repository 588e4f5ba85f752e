//! The engine facade: one object owning the store and every derived cache.
//!
//! # Overview
//!
//! [`Engine`] is the single entry point embedders hold. Insertions go
//! through the store (which enforces ids, weights, and acyclicity) and end
//! by dropping the derived caches; queries consult the caches before
//! recomputing. The same object answers both the curriculum-flavored
//! queries (learning path, prerequisite closure) and the general graph
//! queries (shortest path, A*, explore, PageRank).
//!
//! # Receivers
//!
//! Structural mutators and cache-filling queries take `&mut self`; pure
//! reads take `&self`. There is no interior mutability, so a shared
//! engine is read-only by construction and cross-thread callers bring
//! their own lock.

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use tracing::instrument;

use strata_core::{
    DEFAULT_WEIGHT, EdgeData, GraphError, GraphStore, NodeData, NodeOutcome, PREREQUISITE_KIND,
    Result,
};

use crate::cache::CacheManager;
use crate::closure::ClosureMatrix;
use crate::config::EngineConfig;
use crate::export::{GraphStats, Snapshot};
use crate::rank::RankConfig;
use crate::{explore, order, paths, rank};

/// Dependency graph engine: store, cycle guard, algorithms, and caches.
#[derive(Debug, Default)]
pub struct Engine {
    store: GraphStore,
    cache: CacheManager,
    config: EngineConfig,
}

impl Engine {
    /// Empty engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Rebuild an engine from an exported snapshot, re-checking every
    /// invariant on the way in.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot holds data a live engine would reject: an
    /// empty node id, a bad weight, an edge endpoint missing from the node
    /// list, or a cycle.
    #[instrument(skip(snapshot))]
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut engine = Self::new();
        for node in snapshot.nodes {
            engine.add_node(NodeData::from(node))?;
        }
        for edge in snapshot.edges {
            engine.add_edge(&edge.source, &edge.target, &edge.relation_kind, edge.weight)?;
        }
        Ok(engine)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert a node, or merge into an existing one with the same id.
    ///
    /// A pure merge changes no structure and keeps the caches warm; a new
    /// node drops them.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyNodeId`] for an empty id.
    pub fn add_node(&mut self, node: NodeData) -> Result<()> {
        if self.store.add_node(node)? == NodeOutcome::Inserted {
            self.cache.invalidate_all();
        }
        Ok(())
    }

    /// Insert or update the directed edge `source -> target`.
    ///
    /// Any successful edge mutation drops the caches; an update can change
    /// the weight, which changes A* costs.
    ///
    /// # Errors
    ///
    /// Rejects self-loops, non-finite or non-positive weights, unknown
    /// endpoints, and edges that would close a cycle (the error carries
    /// the offending path). A rejected edge changes nothing.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        relation_kind: &str,
        weight: f64,
    ) -> Result<()> {
        self.store.add_edge(source, target, relation_kind, weight)?;
        self.cache.invalidate_all();
        Ok(())
    }

    /// `add_edge` with the prerequisite relation and default weight.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::add_edge`].
    pub fn add_dependency(&mut self, source: &str, target: &str) -> Result<()> {
        self.add_edge(source, target, PREREQUISITE_KIND, DEFAULT_WEIGHT)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown id.
    pub fn get_node(&self, id: &str) -> Result<&NodeData> {
        self.store.get_node(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    #[must_use]
    pub fn get_edge(&self, source: &str, target: &str) -> Option<&EdgeData> {
        self.store.get_edge(source, target)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.store.node_ids()
    }

    /// Nodes with no prerequisites: where a learner can start.
    #[must_use]
    pub fn roots(&self) -> Vec<String> {
        self.store.roots()
    }

    /// Nodes nothing depends on.
    #[must_use]
    pub fn leaves(&self) -> Vec<String> {
        self.store.leaves()
    }

    /// Order-independent fingerprint of the graph's content.
    #[must_use]
    pub fn content_hash(&self) -> String {
        self.store.content_hash()
    }

    /// Read access to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &GraphStore {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// How many times the derived caches have been invalidated.
    #[must_use]
    pub const fn cache_version(&self) -> u64 {
        self.cache.version()
    }

    // -----------------------------------------------------------------------
    // Ordering and closure
    // -----------------------------------------------------------------------

    /// Full topological order of the graph (cached).
    pub fn topological_order(&mut self) -> Vec<String> {
        let store = &self.store;
        self.cache
            .topo_or_insert_with(|| order::topological_order(store.graph()))
            .to_vec()
    }

    /// Direct or transitive prerequisites of `id`. The transitive answer
    /// comes from the cached closure matrix.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown id.
    pub fn prerequisites(&mut self, id: &str, transitive: bool) -> Result<HashSet<String>> {
        if !transitive {
            return self.store.prerequisites_of(id);
        }
        let idx = self.require(id)?;
        let store = &self.store;
        let closure = self
            .cache
            .closure_or_insert_with(|| ClosureMatrix::build(store.graph()));
        Ok(id_set(store, closure.ancestors_of(idx)))
    }

    /// Direct or transitive dependents of `id`. The transitive answer is
    /// the closure matrix's column scan.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown id.
    pub fn dependents(&mut self, id: &str, transitive: bool) -> Result<HashSet<String>> {
        if !transitive {
            return self.store.dependents_of(id);
        }
        let idx = self.require(id)?;
        let store = &self.store;
        let closure = self
            .cache
            .closure_or_insert_with(|| ClosureMatrix::build(store.graph()));
        Ok(id_set(store, closure.descendants_of(idx)))
    }

    /// Everything to learn before `target`, in learnable order, ending
    /// with `target` itself: the topological order filtered to the
    /// transitive prerequisites.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown target.
    pub fn learning_path(&mut self, target: &str) -> Result<Vec<String>> {
        let ancestors = self.prerequisites(target, true)?;
        let order = self.topological_order();
        Ok(order
            .into_iter()
            .filter(|id| id.as_str() == target || ancestors.contains(id))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Paths and exploration
    // -----------------------------------------------------------------------

    /// Fewest-hops path from `start` to `goal` (cached per pair). Empty
    /// when either endpoint is unknown or the goal is unreachable;
    /// `[start]` when the endpoints coincide.
    pub fn shortest_path(&mut self, start: &str, goal: &str) -> Vec<String> {
        let (Some(start_idx), Some(goal_idx)) =
            (self.store.index_of(start), self.store.index_of(goal))
        else {
            return Vec::new();
        };
        let store = &self.store;
        self.cache
            .path_or_insert_with(start, goal, || {
                paths::shortest_path(store.graph(), start_idx, goal_idx)
                    .map(|path| to_ids(store, &path))
                    .unwrap_or_default()
            })
            .to_vec()
    }

    /// Cheapest path from `start` to `goal` by accumulated edge weight,
    /// guided by `heuristic` (see [`paths::astar_path`]). Same empty-path
    /// conventions as [`Self::shortest_path`]. Never cached: the
    /// heuristic is an arbitrary closure.
    pub fn heuristic_path<H>(&self, start: &str, goal: &str, heuristic: H) -> Vec<String>
    where
        H: Fn(&NodeData, &NodeData) -> f64,
    {
        let (Some(start_idx), Some(goal_idx)) =
            (self.store.index_of(start), self.store.index_of(goal))
        else {
            return Vec::new();
        };
        paths::astar_path(self.store.graph(), start_idx, goal_idx, heuristic)
            .map(|(path, _)| to_ids(&self.store, &path))
            .unwrap_or_default()
    }

    /// Everything within `max_depth` hops of `id`, including `id` itself.
    /// Unknown ids give the empty set; this query never fails.
    #[must_use]
    pub fn explore(&self, id: &str, max_depth: usize) -> HashSet<String> {
        let Some(idx) = self.store.index_of(id) else {
            return HashSet::new();
        };
        id_set(
            &self.store,
            explore::reachable_within(self.store.graph(), idx, max_depth).into_iter(),
        )
    }

    // -----------------------------------------------------------------------
    // Importance
    // -----------------------------------------------------------------------

    /// PageRank scores under the engine's configured parameters (cached).
    pub fn importance(&mut self) -> HashMap<String, f64> {
        let store = &self.store;
        let config = &self.config.rank;
        self.cache
            .ranks_or_insert_with(|| rank::pagerank(store.graph(), config).scores)
            .clone()
    }

    /// PageRank with caller-supplied parameters; bypasses the cache.
    #[must_use]
    pub fn importance_with(&self, config: &RankConfig) -> HashMap<String, f64> {
        rank::pagerank(self.store.graph(), config).scores
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Serializable snapshot of the current graph.
    #[must_use]
    pub fn export(&self) -> Snapshot {
        Snapshot::from_store(&self.store)
    }

    /// Whole-graph summary statistics.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats::from_store(&self.store)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn require(&self, id: &str) -> Result<NodeIndex> {
        self.store
            .index_of(id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    }
}

fn to_ids(store: &GraphStore, path: &[NodeIndex]) -> Vec<String> {
    path.iter()
        .filter_map(|&idx| store.id_of(idx))
        .map(String::from)
        .collect()
}

fn id_set(store: &GraphStore, indexes: impl Iterator<Item = NodeIndex>) -> HashSet<String> {
    indexes
        .filter_map(|idx| store.id_of(idx))
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(id: &str) -> NodeData {
        NodeData::new(id, "concept")
    }

    fn engine_with(nodes: &[&str], deps: &[(&str, &str)]) -> Engine {
        let mut engine = Engine::new();
        for &id in nodes {
            engine.add_node(concept(id)).unwrap();
        }
        for &(source, target) in deps {
            engine.add_dependency(source, target).unwrap();
        }
        engine
    }

    /// Heavy route through B first, light route through C second.
    fn two_route_engine() -> Engine {
        let mut engine = engine_with(&["A", "B", "C", "D"], &[]);
        engine.add_edge("A", "B", PREREQUISITE_KIND, 5.0).unwrap();
        engine.add_edge("B", "D", PREREQUISITE_KIND, 5.0).unwrap();
        engine.add_edge("A", "C", PREREQUISITE_KIND, 1.0).unwrap();
        engine.add_edge("C", "D", PREREQUISITE_KIND, 1.0).unwrap();
        engine
    }

    // -----------------------------------------------------------------------
    // Invalidation wiring
    // -----------------------------------------------------------------------

    #[test]
    fn new_nodes_invalidate_merges_do_not() {
        let mut engine = Engine::new();
        assert_eq!(engine.cache_version(), 0);

        engine.add_node(concept("sets")).unwrap();
        assert_eq!(engine.cache_version(), 1);

        engine
            .add_node(concept("sets").with_attribute("membership"))
            .unwrap();
        assert_eq!(engine.cache_version(), 1, "a pure merge keeps caches warm");

        engine.add_node(concept("logic")).unwrap();
        assert_eq!(engine.cache_version(), 2);
    }

    #[test]
    fn every_edge_mutation_invalidates() {
        let mut engine = engine_with(&["A", "B"], &[]);
        let start = engine.cache_version();

        engine.add_dependency("A", "B").unwrap();
        assert_eq!(engine.cache_version(), start + 1);

        // Re-linking updates the payload; weights feed A*, so this also
        // drops the caches.
        engine.add_edge("A", "B", "blocks", 2.0).unwrap();
        assert_eq!(engine.cache_version(), start + 2);
    }

    #[test]
    fn rejected_mutations_do_not_invalidate() {
        let mut engine = engine_with(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let version = engine.cache_version();

        let err = engine.add_dependency("C", "A").unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
        assert_eq!(engine.cache_version(), version);
        assert_eq!(engine.edge_count(), 2);
    }

    #[test]
    fn cached_paths_are_refreshed_by_mutation() {
        let mut engine = engine_with(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        assert_eq!(engine.shortest_path("A", "C"), vec!["A", "B", "C"]);

        engine.add_dependency("A", "C").unwrap();
        assert_eq!(
            engine.shortest_path("A", "C"),
            vec!["A", "C"],
            "the cached two-hop answer must not survive the new shortcut"
        );
    }

    #[test]
    fn reads_do_not_tick_the_version() {
        let mut engine = engine_with(&["A", "B"], &[("A", "B")]);
        let version = engine.cache_version();

        let _ = engine.topological_order();
        let _ = engine.shortest_path("A", "B");
        let _ = engine.importance();
        let _ = engine.prerequisites("B", true);

        assert_eq!(engine.cache_version(), version);
    }

    // -----------------------------------------------------------------------
    // Ordering and closure
    // -----------------------------------------------------------------------

    #[test]
    fn chain_orders_linearly() {
        let mut engine = engine_with(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        );
        assert_eq!(engine.topological_order(), vec!["A", "B", "C", "D"]);
        assert_eq!(engine.topological_order(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn prerequisites_direct_and_transitive() {
        let mut engine = engine_with(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);

        assert_eq!(
            engine.prerequisites("C", false).unwrap(),
            HashSet::from(["B".to_string()])
        );
        assert_eq!(
            engine.prerequisites("C", true).unwrap(),
            HashSet::from(["A".to_string(), "B".to_string()])
        );
        assert_eq!(
            engine.dependents("A", true).unwrap(),
            HashSet::from(["B".to_string(), "C".to_string()])
        );
        assert!(engine.prerequisites("missing", true).is_err());
    }

    #[test]
    fn learning_path_is_the_filtered_topo_order() {
        let mut engine = engine_with(
            &["A", "B", "C", "D", "X"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );

        assert_eq!(engine.learning_path("D").unwrap(), vec!["A", "B", "C", "D"]);
        assert_eq!(engine.learning_path("B").unwrap(), vec!["A", "B"]);
        assert_eq!(engine.learning_path("X").unwrap(), vec!["X"]);
        assert!(matches!(
            engine.learning_path("missing"),
            Err(GraphError::NodeNotFound { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Paths and exploration
    // -----------------------------------------------------------------------

    #[test]
    fn bfs_follows_hops_astar_follows_weights() {
        let mut engine = two_route_engine();

        assert_eq!(engine.shortest_path("A", "D"), vec!["A", "B", "D"]);
        assert_eq!(
            engine.heuristic_path("A", "D", |_, _| 0.0),
            vec!["A", "C", "D"]
        );
        assert_eq!(
            engine.heuristic_path("A", "D", paths::kind_similarity),
            vec!["A", "C", "D"]
        );
    }

    #[test]
    fn path_conventions_for_unknown_and_identical_endpoints() {
        let mut engine = engine_with(&["A", "B"], &[("A", "B")]);

        assert!(engine.shortest_path("A", "missing").is_empty());
        assert!(engine.shortest_path("missing", "B").is_empty());
        assert!(engine.shortest_path("B", "A").is_empty(), "edges are directed");
        assert_eq!(engine.shortest_path("A", "A"), vec!["A"]);
        assert!(engine.heuristic_path("A", "missing", |_, _| 0.0).is_empty());
        assert_eq!(engine.heuristic_path("A", "A", |_, _| 0.0), vec!["A"]);
    }

    #[test]
    fn explore_bounds_the_neighborhood() {
        let engine = engine_with(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        );

        assert_eq!(
            engine.explore("A", 0),
            HashSet::from(["A".to_string()])
        );
        assert_eq!(
            engine.explore("A", 2),
            HashSet::from(["A".to_string(), "B".to_string(), "C".to_string()])
        );
        assert!(engine.explore("missing", 3).is_empty());
    }

    // -----------------------------------------------------------------------
    // Importance
    // -----------------------------------------------------------------------

    #[test]
    fn hub_target_ranks_highest() {
        let mut engine = engine_with(
            &["A", "B", "C", "D"],
            &[("A", "D"), ("B", "D"), ("C", "D")],
        );

        let scores = engine.importance();
        for id in ["A", "B", "C"] {
            assert!(
                scores["D"] > scores[id],
                "D ({}) should outrank {id} ({})",
                scores["D"],
                scores[id]
            );
        }

        // Same answer from the warm cache.
        assert_eq!(engine.importance(), scores);
    }

    #[test]
    fn importance_with_bypasses_config_and_cache() {
        let engine = engine_with(
            &["A", "B", "C", "D"],
            &[("A", "D"), ("B", "D"), ("C", "D")],
        );

        let one_iter = engine.importance_with(&RankConfig {
            iterations: 1,
            ..RankConfig::default()
        });
        assert!((one_iter["D"] - 0.675).abs() < 1e-12);
    }

    // -----------------------------------------------------------------------
    // Facade reads and rebuild
    // -----------------------------------------------------------------------

    #[test]
    fn add_dependency_uses_the_default_relation() {
        let engine = engine_with(&["limits", "derivative"], &[("limits", "derivative")]);

        let edge = engine.get_edge("limits", "derivative").unwrap();
        assert_eq!(edge.relation_kind, PREREQUISITE_KIND);
        assert!((edge.weight - DEFAULT_WEIGHT).abs() < f64::EPSILON);
        assert_eq!(engine.roots(), vec!["limits"]);
        assert_eq!(engine.leaves(), vec!["derivative"]);
    }

    #[test]
    fn snapshot_round_trips_through_the_engine() {
        let mut engine = two_route_engine();
        engine
            .add_node(concept("A").with_metadata("source", serde_json::json!("notes")))
            .unwrap();

        let exported = engine.export();
        let rebuilt = Engine::from_snapshot(exported.clone()).unwrap();

        assert_eq!(rebuilt.export(), exported);
        assert_eq!(rebuilt.content_hash(), engine.content_hash());
    }

    #[test]
    fn from_snapshot_rejects_tampered_documents() {
        let engine = engine_with(&["A", "B"], &[("A", "B")]);
        let mut snapshot = engine.export();
        snapshot.edges.push(crate::export::EdgeExport {
            source: "B".to_string(),
            target: "A".to_string(),
            relation_kind: PREREQUISITE_KIND.to_string(),
            weight: 1.0,
        });

        let err = Engine::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }
}
