//! Error taxonomy for the graph engine.
//!
//! Two layers:
//!
//! - [`GraphError`] — the typed error returned by fallible store and query
//!   operations. Every variant is recoverable by the caller.
//! - [`ErrorCode`] — stable machine-readable codes (`E####`) for
//!   diagnostics. The fatal invariant violation (a cycle surviving into the
//!   topological sort) has a code but no `GraphError` variant: it is a bug
//!   in the engine, reported by panic, never by `Err`.

use std::fmt;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, GraphError>;

// ---------------------------------------------------------------------------
// GraphError
// ---------------------------------------------------------------------------

/// Error returned by graph construction and query operations.
///
/// Construction errors are raised before any index mutation: a failed call
/// leaves the store exactly as it was.
///
/// `Display` and `std::error::Error` are implemented by hand: a thiserror
/// derive would treat the spec-mandated `source` field (an edge endpoint
/// id, not a cause) as the error's `source()`, which does not type-check
/// for `String`. These are leaf errors with no underlying cause.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A node was submitted with an empty id.
    EmptyNodeId,

    /// An edge was submitted with a non-positive or non-finite weight.
    InvalidWeight {
        source: String,
        target: String,
        weight: f64,
    },

    /// An edge was submitted with identical endpoints.
    SelfLoop { id: String },

    /// An operation referenced a node id that is not in the store.
    NodeNotFound { id: String },

    /// Inserting the edge would close a dependency cycle.
    ///
    /// `path` walks the would-be cycle starting and ending at `source`
    /// (the new edge first, then the existing chain back to `source`). It
    /// is diagnostic only.
    CycleDetected {
        source: String,
        target: String,
        path: Vec<String>,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNodeId => write!(f, "node id must be non-empty"),
            Self::InvalidWeight {
                source,
                target,
                weight,
            } => write!(
                f,
                "edge {source} -> {target} has invalid weight {weight}; weights must be finite and > 0"
            ),
            Self::SelfLoop { id } => write!(f, "self-loop rejected: {id} -> {id}"),
            Self::NodeNotFound { id } => write!(f, "node not found: {id}"),
            Self::CycleDetected {
                source,
                target,
                path,
            } => write!(
                f,
                "adding {source} -> {target} would create a cycle: {}",
                join_path(path)
            ),
        }
    }
}

impl std::error::Error for GraphError {}

impl GraphError {
    /// Stable code for this error, for logs and machine parsing.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyNodeId => ErrorCode::EmptyNodeId,
            Self::InvalidWeight { .. } => ErrorCode::InvalidWeight,
            Self::SelfLoop { .. } => ErrorCode::SelfLoop,
            Self::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
        }
    }
}

fn join_path(path: &[String]) -> String {
    path.join(" -> ")
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable error codes for embedder-friendly decision making.
///
/// `E1xxx` — malformed input and lookup failures. `E2xxx` — structural
/// rejections. `E9xxx` — fatal invariant violations (panic only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyNodeId,
    InvalidWeight,
    SelfLoop,
    NodeNotFound,
    CycleDetected,
    InvariantViolation,
}

impl ErrorCode {
    /// Every code, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::EmptyNodeId,
        Self::InvalidWeight,
        Self::SelfLoop,
        Self::NodeNotFound,
        Self::CycleDetected,
        Self::InvariantViolation,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyNodeId => "E1001",
            Self::InvalidWeight => "E1002",
            Self::SelfLoop => "E1003",
            Self::NodeNotFound => "E1004",
            Self::CycleDetected => "E2001",
            Self::InvariantViolation => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyNodeId => "Node id is empty",
            Self::InvalidWeight => "Edge weight is not a positive finite number",
            Self::SelfLoop => "Edge endpoints are identical",
            Self::NodeNotFound => "Node not found",
            Self::CycleDetected => "Cycle would be created",
            Self::InvariantViolation => "Acyclicity invariant violated",
        }
    }

    /// Optional remediation hint that can be surfaced to embedders.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyNodeId => Some("Give every node a non-empty, unique id."),
            Self::InvalidWeight => Some("Use a finite weight greater than zero (default 1.0)."),
            Self::SelfLoop => Some("A node cannot be its own prerequisite; drop the edge."),
            Self::NodeNotFound => Some("Insert both endpoint nodes before linking them."),
            Self::CycleDetected => {
                Some("Remove or re-point one of the listed dependencies to keep the graph acyclic.")
            }
            Self::InvariantViolation => {
                Some("This is a bug in the engine, not in your input. Please report it.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
