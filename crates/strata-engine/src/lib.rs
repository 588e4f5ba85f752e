#![forbid(unsafe_code)]
//! strata-engine library.
//!
//! Algorithms and orchestration over a [`strata_core::GraphStore`]:
//! topological ordering, transitive closure, path finding, bounded
//! exploration, PageRank, invalidation-tracked caching, and the JSON
//! snapshot format. [`Engine`] ties them together behind one facade.
//!
//! # Conventions
//!
//! - **Errors**: Graph operations return `strata_core::Result`;
//!   configuration loading returns `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`warn!`, `debug!`, `trace!`).

pub mod cache;
pub mod closure;
pub mod config;
pub mod engine;
pub mod explore;
pub mod export;
pub mod order;
pub mod paths;
pub mod rank;

pub use config::EngineConfig;
pub use engine::Engine;
pub use export::{EdgeExport, GraphStats, NodeExport, Snapshot, SnapshotMetadata};
pub use rank::{RankConfig, RankResult};
