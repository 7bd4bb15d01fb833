//! Pipeline configuration: TOML-backed types with per-field defaults.

mod defaults;
mod loader;
mod types;

pub use types::{ContextSettings, MonitorSettings, PipelineConfig, QuerySettings, SnapshotSettings};
