use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A uniquely identified vertex carrying domain payload.
///
/// `id` is immutable once the node is in a store. Re-inserting an existing
/// id merges instead of erroring: `attributes` are unioned append-only in
/// insertion order, `kind` and `metadata` keys are last-write-wins, and
/// `updated_at` is bumped. `created_at` always keeps the first-insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Unique, non-empty identifier.
    pub id: String,
    /// Free-form type tag ("axiom", "concept", "theorem", "algorithm", ...).
    pub kind: String,
    /// Ordered, deduplicated observation strings. Append-only.
    pub attributes: Vec<String>,
    /// Auxiliary values, opaque to the engine.
    pub metadata: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NodeData {
    /// Build a node with empty attributes/metadata and both timestamps set
    /// to now.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind: kind.into(),
            attributes: Vec::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one observation, keeping order and uniqueness.
    pub fn push_attribute(&mut self, attribute: impl Into<String>) {
        let attribute = attribute.into();
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute);
        }
    }

    /// Builder-style [`Self::push_attribute`].
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.push_attribute(attribute);
        self
    }

    /// Builder-style metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Fold `incoming` (same id) into `self` per the merge policy.
    ///
    /// Attributes are unioned in insertion order, `kind` and metadata keys
    /// are last-write-wins, `updated_at` is set to now. The incoming
    /// timestamps are discarded.
    pub fn merge_from(&mut self, incoming: Self) {
        debug_assert_eq!(self.id, incoming.id, "merge requires matching ids");
        self.kind = incoming.kind;
        for attribute in incoming.attributes {
            if !self.attributes.contains(&attribute) {
                self.attributes.push(attribute);
            }
        }
        self.metadata.extend(incoming.metadata);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_node_starts_empty_with_equal_timestamps() {
        let node = NodeData::new("derivative", "concept");
        assert_eq!(node.id, "derivative");
        assert_eq!(node.kind, "concept");
        assert!(node.attributes.is_empty());
        assert!(node.metadata.is_empty());
        assert_eq!(node.created_at, node.updated_at);
    }

    #[test]
    fn push_attribute_deduplicates_but_keeps_order() {
        let mut node = NodeData::new("limits", "concept");
        node.push_attribute("rate of change");
        node.push_attribute("epsilon-delta");
        node.push_attribute("rate of change");

        assert_eq!(node.attributes, vec!["rate of change", "epsilon-delta"]);
    }

    #[test]
    fn merge_unions_attributes_in_insertion_order() {
        let mut existing = NodeData::new("integral", "concept")
            .with_attribute("area under a curve")
            .with_attribute("antiderivative");
        let incoming = NodeData::new("integral", "concept")
            .with_attribute("antiderivative")
            .with_attribute("Riemann sums");

        existing.merge_from(incoming);

        assert_eq!(
            existing.attributes,
            vec!["area under a curve", "antiderivative", "Riemann sums"]
        );
    }

    #[test]
    fn merge_is_last_write_wins_for_kind_and_metadata() {
        let mut existing =
            NodeData::new("pagerank", "concept").with_metadata("source", json!("survey.pdf"));
        let incoming = NodeData::new("pagerank", "algorithm")
            .with_metadata("source", json!("brin-page-1998.pdf"))
            .with_metadata("difficulty", json!(3));

        existing.merge_from(incoming);

        assert_eq!(existing.kind, "algorithm");
        assert_eq!(existing.metadata["source"], json!("brin-page-1998.pdf"));
        assert_eq!(existing.metadata["difficulty"], json!(3));
    }

    #[test]
    fn merge_keeps_created_at_and_bumps_updated_at() {
        let mut existing = NodeData::new("topology", "concept");
        let created = existing.created_at;
        let incoming = NodeData::new("topology", "concept").with_attribute("open sets");

        existing.merge_from(incoming);

        assert_eq!(existing.created_at, created);
        assert!(existing.updated_at >= created);
    }
}
