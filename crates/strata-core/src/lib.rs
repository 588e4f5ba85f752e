#![forbid(unsafe_code)]
//! strata-core library.
//!
//! The data layer of the strata dependency graph engine: node/edge model,
//! error taxonomy, and the [`GraphStore`], which owns the adjacency indexes
//! and enforces the structural invariants (unique non-empty ids, positive
//! edge weights, no self-loops, no cycles).
//!
//! # Conventions
//!
//! - **Errors**: Fallible operations return [`Result`] with the typed
//!   [`GraphError`]; every variant carries a stable [`ErrorCode`].
//! - **Logging**: Use `tracing` macros (`warn!`, `debug!`, `trace!`).

pub mod cycles;
pub mod error;
pub mod model;
pub mod store;

pub use error::{ErrorCode, GraphError, Result};
pub use model::{DEFAULT_WEIGHT, EdgeData, NodeData, PREREQUISITE_KIND};
pub use store::{EdgeOutcome, GraphStore, NodeOutcome};
