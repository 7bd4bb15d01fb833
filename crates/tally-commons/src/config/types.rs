//! Pipeline configuration types.

use super::defaults::*;
use serde::{Deserialize, Serialize};

/// Main pipeline configuration.
///
/// Every section and field has a default, so an empty TOML file (or no
/// file at all) yields a fully usable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub snapshots: SnapshotSettings,
    #[serde(default)]
    pub context: ContextSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
}

/// Query building and execution limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Maximum JOINs allowed in a validated statement.
    #[serde(default = "default_max_joins")]
    pub max_joins: usize,

    /// Row cap appended when a statement carries no LIMIT.
    #[serde(default = "default_row_cap")]
    pub default_row_cap: u64,

    /// Hard ceiling; caller caps above it are clamped down.
    #[serde(default = "default_row_cap_ceiling")]
    pub row_cap_ceiling: u64,

    /// Engine execution timeout. A timeout is an execution error and is
    /// never retried.
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_joins: default_max_joins(),
            default_row_cap: default_row_cap(),
            row_cap_ceiling: default_row_cap_ceiling(),
            execution_timeout_ms: default_execution_timeout_ms(),
        }
    }
}

/// Snapshot file locations and table naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSettings {
    /// Directory holding the backing columnar snapshot files.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,

    /// Prefix for registered in-memory table names.
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Snapshot the pipeline queries by default.
    #[serde(default = "default_snapshot")]
    pub default_snapshot: String,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            table_prefix: default_table_prefix(),
            default_snapshot: default_snapshot(),
        }
    }
}

/// Context compaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSettings {
    /// Maximum rows rendered into the details table.
    #[serde(default = "default_details_row_cap")]
    pub details_row_cap: usize,

    /// Characters-per-token constant for the approximate token estimate.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            details_row_cap: default_details_row_cap(),
            chars_per_token: default_chars_per_token(),
        }
    }
}

/// Query performance monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Executions at or above this duration count as slow.
    #[serde(default = "default_slow_query_threshold_ms")]
    pub slow_query_threshold_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: default_slow_query_threshold_ms(),
        }
    }
}
