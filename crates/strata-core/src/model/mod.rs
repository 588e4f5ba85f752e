//! Node and edge payload types.
//!
//! Identity is immutable once a payload is in a [`crate::store::GraphStore`];
//! everything else follows the merge policy documented on [`NodeData`].

mod edge;
mod node;

pub use edge::{derive_edge_id, EdgeData, DEFAULT_WEIGHT, PREREQUISITE_KIND};
pub use node::NodeData;
