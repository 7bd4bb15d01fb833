//! The Tally analytics pipeline.
//!
//! Turns an already-classified [`Intent`] into a safety-checked,
//! tenant-scoped aggregation query against the embedded analytical
//! engine, validates the numeric result against the Truth Contract, and
//! compacts it into a token-budgeted [`StructuredContext`] for the
//! downstream generator.
//!
//! Flow: intent → query builder → snapshot cache / engine → metrics
//! calculator → truth contract validator → context compactor. The
//! performance monitor observes every execution without altering flow.

pub mod calculator;
pub mod context;
pub mod format;
pub mod shaping;
pub mod truth;

use std::sync::Arc;

use tally_commons::config::PipelineConfig;
use tally_commons::models::context::StructuredContext;
use tally_commons::models::intent::Intent;
use tally_commons::Result;
use tally_observability::{QueryStatsRegistry, QueryStatsReport};
use tally_snapshots::{AnalyticsEngine, SnapshotCache, SnapshotCacheStats};

pub use calculator::MetricsCalculator;
pub use context::ContextCompactor;
pub use tally_commons::PipelineError;
pub use tally_sql::RlsScope;
pub use truth::{TruthContractValidator, ValidatedMetrics};

/// The public entry point spanning query building through context
/// compaction. One per process; cheap to share behind an `Arc`.
pub struct AnalyticsPipeline {
    calculator: MetricsCalculator,
    compactor: ContextCompactor,
    cache: Arc<SnapshotCache>,
    stats: Arc<QueryStatsRegistry>,
}

impl AnalyticsPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        let engine = Arc::new(AnalyticsEngine::new(&config.query));
        let cache = Arc::new(SnapshotCache::new(engine.clone(), &config.snapshots));
        let stats = Arc::new(QueryStatsRegistry::new(&config.monitor));

        Self {
            calculator: MetricsCalculator::new(engine, cache.clone(), stats.clone(), config),
            compactor: ContextCompactor::new(&config.context),
            cache,
            stats,
        }
    }

    /// Compute metrics for one intent under one caller scope and compact
    /// them into a context block.
    ///
    /// Errors short-circuit: nothing from a failed build or execution
    /// reaches the truth gate, and nothing that fails the truth gate
    /// reaches the compactor.
    pub async fn compute_metrics(
        &self,
        intent: &Intent,
        scope: &RlsScope,
    ) -> Result<StructuredContext> {
        let result = self.calculator.compute(intent, scope).await?;
        let validated = TruthContractValidator::check(result)?;

        for warning in validated.warnings() {
            log::debug!("truth contract warning: {}", warning);
        }

        Ok(self.compactor.build(&validated, intent))
    }

    /// Read-only performance statistics. Not on the request path.
    pub fn performance_snapshot(&self) -> QueryStatsReport {
        self.stats.report()
    }

    /// Registered-snapshot statistics. Not on the request path.
    pub fn snapshot_stats(&self) -> SnapshotCacheStats {
        self.cache.stats()
    }

    /// Drop one snapshot registration so the next request re-loads the
    /// backing file. Administrative.
    pub fn invalidate_snapshot(&self, name: &str) -> Result<()> {
        self.cache.invalidate(name)
    }

    /// Drop every snapshot registration. Administrative.
    pub fn invalidate_all(&self) -> Result<()> {
        self.cache.invalidate_all()
    }
}
