//! Snapshot loading and engine access for the Tally analytics pipeline.
//!
//! The engine is a black box behind two operations: register a snapshot
//! file as a table, execute a validated query. The cache guarantees one
//! file-load per snapshot name per process lifetime.

pub mod cache;
pub mod engine;
pub mod rows;

pub use cache::{SnapshotCache, SnapshotCacheStats, SnapshotHandle};
pub use engine::AnalyticsEngine;
pub use rows::{EngineRows, JsonRow};
