//! Incremental cycle detection for edge insertion.
//!
//! # Edge direction
//!
//! Edges point `prerequisite -> dependent`. Adding `source -> target` closes
//! a cycle exactly when `target` already reaches `source` through existing
//! edges, so the guard searches forward from `target` looking for `source`.
//! (Walking the reverse adjacency from `source` visits the same paths in
//! the opposite order; the forward walk keeps parent pointers aligned with
//! the reported path.)

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::{EdgeData, NodeData};

/// Check whether adding `source -> target` would introduce a cycle.
///
/// Returns the concrete cycle path when one would be created, formatted as
/// `source -> target -> ... -> source`: the new edge first, then the
/// existing chain that closes the loop. Neighbors are explored in edge
/// insertion order, so the reported path is stable for a fixed build
/// sequence.
///
/// Callers must have already rejected self-loops and duplicate
/// `(source, target)` pairs; both checks happen at the store boundary
/// before any cycle work.
#[must_use]
pub fn would_create_cycle(
    graph: &DiGraph<NodeData, EdgeData>,
    source: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<String>> {
    debug_assert_ne!(source, target, "self-loops are rejected before the guard");
    debug_assert!(
        graph.find_edge(source, target).is_none(),
        "duplicate edges are updated before the guard"
    );

    // BFS from `target` looking for `source`.
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([target]);
    let mut visited: HashSet<NodeIndex> = HashSet::from([target]);
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if current == source {
            return Some(reconstruct_cycle_path(graph, source, target, &parent));
        }

        // petgraph iterates neighbors most-recent-first; restore insertion
        // order so diagnostics follow the oldest edges.
        let mut successors: Vec<NodeIndex> = graph.neighbors(current).collect();
        successors.reverse();

        for next in successors {
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

fn reconstruct_cycle_path(
    graph: &DiGraph<NodeData, EdgeData>,
    source: NodeIndex,
    target: NodeIndex,
    parent: &HashMap<NodeIndex, NodeIndex>,
) -> Vec<String> {
    // Parent links encode a path target -> ... -> source. Rebuild it, then
    // prepend `source` for the new edge that would close the cycle.
    let mut source_to_target: Vec<NodeIndex> = vec![source];
    let mut cursor = source;

    while cursor != target {
        if let Some(next) = parent.get(&cursor) {
            cursor = *next;
            source_to_target.push(cursor);
        } else {
            break;
        }
    }

    source_to_target.reverse();

    let mut cycle: Vec<String> = Vec::with_capacity(source_to_target.len() + 1);
    cycle.push(node_id(graph, source));
    cycle.extend(source_to_target.into_iter().map(|idx| node_id(graph, idx)));
    cycle
}

fn node_id(graph: &DiGraph<NodeData, EdgeData>, idx: NodeIndex) -> String {
    graph
        .node_weight(idx)
        .map_or_else(|| format!("#{}", idx.index()), |node| node.id.clone())
}
