//! Deterministic topological ordering (Kahn's algorithm).
//!
//! # Overview
//!
//! Produces a total order of the graph's nodes in which every edge points
//! forward: for each `u -> v`, `u` appears before `v`. On a prerequisite
//! graph this is the order a learner can visit nodes without ever missing a
//! prerequisite.
//!
//! # Algorithm
//!
//! 1. Count in-degrees from the edge list.
//! 2. Seed a FIFO queue with all zero-in-degree nodes, in insertion order.
//! 3. Repeatedly dequeue a node, emit it, and decrement each successor's
//!    in-degree; successors that reach zero are enqueued, again in edge
//!    insertion order.
//!
//! The FIFO queue plus insertion-order tie-breaks make the result a pure
//! function of the build sequence. Runs in O(V + E).

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, NodeIndex};

use strata_core::{EdgeData, NodeData};

// ---------------------------------------------------------------------------
// Kahn's algorithm
// ---------------------------------------------------------------------------

/// Raw Kahn pass. Returns however many nodes it could order; on a graph
/// with a cycle the result is shorter than the node count, since the
/// cycle's members never reach in-degree zero.
#[must_use]
pub fn kahn_indices(graph: &DiGraph<NodeData, EdgeData>) -> Vec<NodeIndex> {
    let mut in_degree = vec![0_usize; graph.node_count()];
    for edge in graph.raw_edges() {
        in_degree[edge.target().index()] += 1;
    }

    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(idx) = queue.pop_front() {
        order.push(idx);

        // petgraph yields successors most-recent-first; reverse to visit
        // them in edge insertion order.
        let mut successors: Vec<NodeIndex> = graph.neighbors(idx).collect();
        successors.reverse();
        for next in successors {
            in_degree[next.index()] -= 1;
            if in_degree[next.index()] == 0 {
                queue.push_back(next);
            }
        }
    }
    order
}

/// Full topological order as node ids.
///
/// # Panics
///
/// Panics with code `E9001` if the sort covers fewer nodes than the graph
/// holds. That means a cycle exists, which insertion-time guarding was
/// supposed to make impossible; the state is unrecoverable and not worth a
/// `Result`.
#[must_use]
pub fn topological_order(graph: &DiGraph<NodeData, EdgeData>) -> Vec<String> {
    let order = kahn_indices(graph);
    assert!(
        order.len() == graph.node_count(),
        "E9001: topological sort covered {} of {} nodes; a cycle bypassed insertion-time guarding",
        order.len(),
        graph.node_count(),
    );
    order.into_iter().map(|idx| graph[idx].id.clone()).collect()
}

/// Whether the graph is acyclic, by Kahn coverage.
#[must_use]
pub fn is_dag(graph: &DiGraph<NodeData, EdgeData>) -> bool {
    kahn_indices(graph).len() == graph.node_count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use strata_core::model::DEFAULT_WEIGHT;

    fn build_graph(nodes: &[&str], edges: &[(&str, &str)]) -> DiGraph<NodeData, EdgeData> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for &id in nodes {
            index.insert(id, graph.add_node(NodeData::new(id, "concept")));
        }
        for &(source, target) in edges {
            graph.add_edge(
                index[source],
                index[target],
                EdgeData::new(source, target, "prerequisite", DEFAULT_WEIGHT),
            );
        }
        graph
    }

    fn positions(order: &[String]) -> HashMap<&str, usize> {
        order
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.as_str(), pos))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let graph = build_graph(&[], &[]);
        assert!(topological_order(&graph).is_empty());
        assert!(is_dag(&graph));
    }

    #[test]
    fn linear_chain_keeps_chain_order() {
        let graph = build_graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        assert_eq!(topological_order(&graph), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn diamond_breaks_ties_by_insertion() {
        // A fans out to B then C; both close on D. B was linked first, so it
        // is emitted first.
        let graph = build_graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        assert_eq!(topological_order(&graph), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn seeds_follow_node_insertion_order() {
        // Two independent roots; X was inserted before A, so X leads.
        let graph = build_graph(&["X", "A", "B"], &[("A", "B")]);
        assert_eq!(topological_order(&graph), vec!["X", "A", "B"]);
    }

    #[test]
    fn every_edge_points_forward() {
        let graph = build_graph(
            &["a", "b", "c", "d", "e", "f"],
            &[
                ("a", "c"),
                ("b", "c"),
                ("c", "e"),
                ("b", "d"),
                ("d", "f"),
                ("e", "f"),
            ],
        );
        let order = topological_order(&graph);
        assert_eq!(order.len(), 6);

        let pos = positions(&order);
        for edge in graph.raw_edges() {
            let source = graph[edge.source()].id.as_str();
            let target = graph[edge.target()].id.as_str();
            assert!(
                pos[source] < pos[target],
                "{source} must sort before {target}"
            );
        }
    }

    #[test]
    fn repeated_sorts_are_identical() {
        let graph = build_graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("C", "D")],
        );
        assert_eq!(topological_order(&graph), topological_order(&graph));
    }

    // -----------------------------------------------------------------------
    // Cycle shortfall
    // -----------------------------------------------------------------------

    #[test]
    fn raw_pass_comes_up_short_on_a_cycle() {
        // The store never lets a cycle in; build one on a raw graph to
        // exercise the shortfall path.
        let mut graph = build_graph(&["A", "B", "C"], &[("A", "B")]);
        let b = graph
            .node_indices()
            .find(|&idx| graph[idx].id == "B")
            .unwrap();
        let a = graph
            .node_indices()
            .find(|&idx| graph[idx].id == "A")
            .unwrap();
        graph.add_edge(b, a, EdgeData::new("B", "A", "prerequisite", 1.0));

        // Only C (in-degree zero) can be emitted.
        assert_eq!(kahn_indices(&graph).len(), 1);
        assert!(!is_dag(&graph));
    }

    #[test]
    #[should_panic(expected = "E9001")]
    fn full_sort_panics_on_a_cycle() {
        let mut graph = build_graph(&["A", "B"], &[("A", "B")]);
        let a = graph
            .node_indices()
            .find(|&idx| graph[idx].id == "A")
            .unwrap();
        let b = graph
            .node_indices()
            .find(|&idx| graph[idx].id == "B")
            .unwrap();
        graph.add_edge(b, a, EdgeData::new("B", "A", "prerequisite", 1.0));

        let _ = topological_order(&graph);
    }
}
