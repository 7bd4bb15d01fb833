//! Metrics calculation: build, execute, shape.

use crate::shaping::shape_result;
use std::sync::Arc;
use std::time::Instant;
use tally_commons::config::PipelineConfig;
use tally_commons::models::intent::Intent;
use tally_commons::models::metrics::MetricsResult;
use tally_commons::Result;
use tally_observability::QueryStatsRegistry;
use tally_snapshots::{AnalyticsEngine, SnapshotCache};
use tally_sql::{query_shape, QueryBuilder, RlsScope};

/// Runs one intent through query building, execution, and shaping.
pub struct MetricsCalculator {
    builder: QueryBuilder,
    engine: Arc<AnalyticsEngine>,
    cache: Arc<SnapshotCache>,
    stats: Arc<QueryStatsRegistry>,
    snapshot: String,
}

impl MetricsCalculator {
    pub fn new(
        engine: Arc<AnalyticsEngine>,
        cache: Arc<SnapshotCache>,
        stats: Arc<QueryStatsRegistry>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            builder: QueryBuilder::new(&config.query),
            engine,
            cache,
            stats,
            snapshot: config.snapshots.default_snapshot.clone(),
        }
    }

    /// Compute the metrics for one intent under one caller scope.
    ///
    /// Execution is observed by the performance monitor whether it
    /// succeeds or fails; failures carry the offending SQL and are never
    /// retried here.
    pub async fn compute(&self, intent: &Intent, scope: &RlsScope) -> Result<MetricsResult> {
        let handle = self.cache.get_table(&self.snapshot).await?;
        let safe = self.builder.build(intent, scope, &handle.table)?;

        let started = Instant::now();
        let outcome = self.engine.execute(&safe).await;
        let elapsed = started.elapsed();

        self.stats.observe(&query_shape(safe.sql()), elapsed);

        let rows = outcome.inspect_err(|e| {
            log::error!("query execution failed: {}", e);
        })?;

        shape_result(&rows, intent, &handle.name, safe.sql(), elapsed.as_millis() as u64)
    }
}
