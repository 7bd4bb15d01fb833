//! The embedded analytical engine behind a narrow adapter.
//!
//! Only two engine operations exist for the rest of the pipeline:
//! registering a snapshot file as a named table and executing a
//! [`SafeQuery`]. The `execute` signature is the structural enforcement
//! of the safety invariant: there is no way to hand the engine raw SQL.

use crate::rows::{batches_to_rows, EngineRows};
use datafusion::execution::context::SessionContext;
use datafusion::prelude::{ParquetReadOptions, SessionConfig};
use std::path::Path;
use std::time::Duration;
use tally_commons::config::QuerySettings;
use tally_commons::{PipelineError, Result};
use tally_sql::SafeQuery;

/// Shared read-only DataFusion session. One per process; DataFusion
/// sessions serve concurrent reads safely.
pub struct AnalyticsEngine {
    ctx: SessionContext,
    timeout: Duration,
}

impl AnalyticsEngine {
    pub fn new(settings: &QuerySettings) -> Self {
        let config = SessionConfig::new()
            .with_information_schema(false)
            .with_default_catalog_and_schema("tally", "analytics");

        Self {
            ctx: SessionContext::new_with_config(config),
            timeout: Duration::from_millis(settings.execution_timeout_ms),
        }
    }

    /// Register a Parquet snapshot file as a named in-memory table.
    pub async fn register_table(&self, table: &str, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| PipelineError::snapshot(format!("non-UTF8 path: {:?}", path)))?;

        self.ctx
            .register_parquet(table, path_str, ParquetReadOptions::default())
            .await
            .map_err(|e| {
                PipelineError::snapshot(format!("failed to register '{}': {}", table, e))
            })
    }

    /// Drop a registered table. Missing tables are not an error.
    pub fn deregister_table(&self, table: &str) -> Result<()> {
        self.ctx
            .deregister_table(table)
            .map(|_| ())
            .map_err(|e| {
                PipelineError::snapshot(format!("failed to deregister '{}': {}", table, e))
            })
    }

    /// Execute a validated statement, bounded by the configured timeout.
    ///
    /// A timeout or engine failure is an [`PipelineError::Execution`]
    /// carrying the offending SQL, and is never retried here: the
    /// snapshot is deterministic and read-only, so a failed statement
    /// fails identically on retry.
    pub async fn execute(&self, query: &SafeQuery) -> Result<EngineRows> {
        let run = async {
            let df = self.ctx.sql(query.sql()).await?;
            df.collect().await
        };

        let batches = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => {
                return Err(PipelineError::execution(
                    format!("query timed out after {}ms", self.timeout.as_millis()),
                    query.sql(),
                ))
            }
            Ok(Err(e)) => {
                return Err(PipelineError::execution(e.to_string(), query.sql()));
            }
            Ok(Ok(batches)) => batches,
        };

        batches_to_rows(&batches)
            .map_err(|e| PipelineError::execution(format!("row conversion failed: {}", e), query.sql()))
    }
}
