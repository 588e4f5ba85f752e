//! Path finding over the forward adjacency: unweighted BFS and weighted A*.
//!
//! # Overview
//!
//! Two searches with different cost models:
//!
//! - [`shortest_path`] minimizes **hop count**, ignoring weights. Level-order
//!   BFS with parent-pointer reconstruction.
//! - [`astar_path`] minimizes **accumulated edge weight**, guided by a
//!   caller-supplied heuristic. With an admissible heuristic (never
//!   overestimates the true remaining cost) the result is optimal;
//!   admissibility is the caller's contract, not checked here.
//!
//! # Determinism
//!
//! petgraph iterates a node's edges most-recent-first. Both searches restore
//! edge insertion order before expanding, and the A* heap breaks `f`-ties by
//! a monotone sequence number, so results are a pure function of the build
//! sequence.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use strata_core::{EdgeData, NodeData};

// ---------------------------------------------------------------------------
// BFS shortest path
// ---------------------------------------------------------------------------

/// Fewest-hops path from `start` to `goal`, or `None` if unreachable.
///
/// Returns `[start]` when `start == goal`.
#[must_use]
pub fn shortest_path(
    graph: &DiGraph<NodeData, EdgeData>,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut visited = HashSet::from([start]);
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for (next, _) in outgoing_in_insertion_order(graph, node) {
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, node);
            if next == goal {
                return Some(reconstruct(&parent, start, goal));
            }
            queue.push_back(next);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// A* search
// ---------------------------------------------------------------------------

/// Heap entry ordered as a min-heap on `f`, then earliest sequence number.
struct Candidate {
    f: f64,
    seq: u64,
    node: NodeIndex,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap and must pop the
        // smallest f first, oldest entry winning ties.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Cheapest path from `start` to `goal` by accumulated edge weight, with the
/// total cost, or `None` if unreachable.
///
/// `heuristic` is called as `heuristic(candidate, goal_node)` and its value
/// is added to the accumulated weight when ordering the frontier. It must
/// never overestimate the remaining cost if the result is to be optimal.
///
/// Returns `([start], 0.0)` when `start == goal`.
#[must_use]
pub fn astar_path<H>(
    graph: &DiGraph<NodeData, EdgeData>,
    start: NodeIndex,
    goal: NodeIndex,
    heuristic: H,
) -> Option<(Vec<NodeIndex>, f64)>
where
    H: Fn(&NodeData, &NodeData) -> f64,
{
    if start == goal {
        return Some((vec![start], 0.0));
    }

    let goal_node = &graph[goal];
    let mut g_score: HashMap<NodeIndex, f64> = HashMap::from([(start, 0.0)]);
    let mut came_from: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut closed: HashSet<NodeIndex> = HashSet::new();

    let mut seq = 0_u64;
    let mut open = BinaryHeap::new();
    open.push(Candidate {
        f: heuristic(&graph[start], goal_node),
        seq,
        node: start,
    });

    while let Some(Candidate { node, .. }) = open.pop() {
        if node == goal {
            let cost = g_score[&node];
            return Some((reconstruct(&came_from, start, goal), cost));
        }
        if !closed.insert(node) {
            continue;
        }

        let g_here = g_score[&node];
        for (next, weight) in outgoing_in_insertion_order(graph, node) {
            if closed.contains(&next) {
                continue;
            }
            let tentative = g_here + weight;
            if g_score.get(&next).is_none_or(|&g| tentative < g) {
                g_score.insert(next, tentative);
                came_from.insert(next, node);
                seq += 1;
                open.push(Candidate {
                    f: tentative + heuristic(&graph[next], goal_node),
                    seq,
                    node: next,
                });
            }
        }
    }
    None
}

/// Default A* heuristic: zero between nodes of the same kind, one otherwise.
///
/// Admissible only while every edge weight is at least 1.0; with lighter
/// edges, supply a heuristic scaled to the weight range (or zero for plain
/// Dijkstra behavior).
#[must_use]
pub fn kind_similarity(a: &NodeData, b: &NodeData) -> f64 {
    if a.kind == b.kind { 0.0 } else { 1.0 }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Outgoing `(target, weight)` pairs in edge insertion order.
fn outgoing_in_insertion_order(
    graph: &DiGraph<NodeData, EdgeData>,
    node: NodeIndex,
) -> Vec<(NodeIndex, f64)> {
    let mut successors: Vec<(NodeIndex, f64)> = graph
        .edges(node)
        .map(|edge| (edge.target(), edge.weight().weight))
        .collect();
    successors.reverse();
    successors
}

fn reconstruct(
    parent: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    goal: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![goal];
    let mut cursor = goal;
    while cursor != start {
        if let Some(&prev) = parent.get(&cursor) {
            path.push(prev);
            cursor = prev;
        } else {
            break;
        }
    }
    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
