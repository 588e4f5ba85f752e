//! Bounded-depth reachability over the forward adjacency.
//!
//! Answers "what is within `max_depth` hops of this node", the
//! neighborhood view a learner uses to survey what a concept unlocks
//! without walking the whole graph.
//!
//! The walk is a depth-limited DFS. A visit is memoized on
//! `(node, remaining_depth)`: reaching a node again with the same or less
//! remaining budget cannot add anything, so the subtree is skipped. The
//! memo lives and dies with one call.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};

use strata_core::{EdgeData, NodeData};

/// All nodes reachable from `start` in at most `max_depth` hops,
/// including `start` itself.
#[must_use]
pub fn reachable_within(
    graph: &DiGraph<NodeData, EdgeData>,
    start: NodeIndex,
    max_depth: usize,
) -> HashSet<NodeIndex> {
    let mut reached = HashSet::new();
    let mut memo = HashSet::new();
    walk(graph, start, max_depth, &mut memo, &mut reached);
    reached
}

fn walk(
    graph: &DiGraph<NodeData, EdgeData>,
    node: NodeIndex,
    remaining: usize,
    memo: &mut HashSet<(NodeIndex, usize)>,
    reached: &mut HashSet<NodeIndex>,
) {
    reached.insert(node);
    if remaining == 0 || !memo.insert((node, remaining)) {
        return;
    }
    for next in graph.neighbors(node) {
        walk(graph, next, remaining - 1, memo, reached);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn build_graph(
        nodes: &[&str],
        edges: &[(&str, &str)],
    ) -> (DiGraph<NodeData, EdgeData>, HashMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for &id in nodes {
            index.insert(id.to_string(), graph.add_node(NodeData::new(id, "concept")));
        }
        for &(source, target) in edges {
            graph.add_edge(
                index[source],
                index[target],
                EdgeData::new(source, target, "prerequisite", 1.0),
            );
        }
        (graph, index)
    }

    fn names<'a>(
        graph: &'a DiGraph<NodeData, EdgeData>,
        set: &HashSet<NodeIndex>,
    ) -> HashSet<&'a str> {
        set.iter().map(|&idx| graph[idx].id.as_str()).collect()
    }

    #[test]
    fn depth_zero_is_just_the_start() {
        let (graph, index) = build_graph(&["A", "B"], &[("A", "B")]);
        let reached = reachable_within(&graph, index["A"], 0);
        assert_eq!(names(&graph, &reached), HashSet::from(["A"]));
    }

    #[test]
    fn chain_is_cut_at_the_depth_limit() {
        let (graph, index) = build_graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        );

        let one = reachable_within(&graph, index["A"], 1);
        assert_eq!(names(&graph, &one), HashSet::from(["A", "B"]));

        let two = reachable_within(&graph, index["A"], 2);
        assert_eq!(names(&graph, &two), HashSet::from(["A", "B", "C"]));
    }

    #[test]
    fn depth_beyond_the_graph_reaches_everything_reachable() {
        let (graph, index) = build_graph(
            &["A", "B", "C", "X"],
            &[("A", "B"), ("B", "C")],
        );
        let reached = reachable_within(&graph, index["A"], 100);
        assert_eq!(names(&graph, &reached), HashSet::from(["A", "B", "C"]));
    }

    #[test]
    fn diamond_counts_shared_nodes_once() {
        let (graph, index) = build_graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")],
        );

        let reached = reachable_within(&graph, index["A"], 2);
        assert_eq!(names(&graph, &reached), HashSet::from(["A", "B", "C", "D"]));
        assert_eq!(reached.len(), 4);
    }

    #[test]
    fn deeper_budget_through_a_shared_node_still_extends() {
        // D is reachable through B with the budget exhausted and directly
        // with budget to spare; the exhausted visit must not block the
        // richer one from continuing to E.
        let (graph, index) = build_graph(
            &["A", "B", "D", "E"],
            &[("A", "B"), ("B", "D"), ("A", "D"), ("D", "E")],
        );

        let reached = reachable_within(&graph, index["A"], 2);
        assert!(names(&graph, &reached).contains("E"));
    }

    #[test]
    fn leaf_start_sees_only_itself() {
        let (graph, index) = build_graph(&["A", "B"], &[("A", "B")]);
        let reached = reachable_within(&graph, index["B"], 5);
        assert_eq!(names(&graph, &reached), HashSet::from(["B"]));
    }
}
