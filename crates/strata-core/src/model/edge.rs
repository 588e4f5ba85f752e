use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default edge weight when the caller does not care about cost.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// The relation kind used by the DAG-flavored convenience API.
pub const PREREQUISITE_KIND: &str = "prerequisite";

/// Payload of a directed, weighted, typed relationship.
///
/// Endpoints live in the graph topology, not here. The `id` is derived from
/// the endpoints, which also pins the one-edge-per-`(source, target)` rule:
/// re-inserting a pair updates this payload in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Derived identifier, `"{source}->{target}"`.
    pub id: String,
    /// Free-form relation tag ("prerequisite", "blocks", "analogy", ...).
    pub relation_kind: String,
    /// Positive finite cost, used by weighted path search.
    pub weight: f64,
    /// Auxiliary values, opaque to the engine.
    pub metadata: BTreeMap<String, Value>,
}

impl EdgeData {
    /// Build an edge payload for `source -> target`.
    ///
    /// Weight validation happens at the store boundary, not here.
    #[must_use]
    pub fn new(
        source: &str,
        target: &str,
        relation_kind: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id: derive_edge_id(source, target),
            relation_kind: relation_kind.into(),
            weight,
            metadata: BTreeMap::new(),
        }
    }
}

/// Deterministic edge id for a `(source, target)` pair.
#[must_use]
pub fn derive_edge_id(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}
