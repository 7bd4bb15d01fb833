//! Query performance monitoring.
//!
//! Every monitored execution records its duration under the statement's
//! normalized shape. The registry is observation only: it never
//! influences results and never fails the request path. Readers get a
//! point-in-time report; the critical path never reads it.

use dashmap::DashMap;
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tally_commons::config::MonitorSettings;

/// Running statistics for one statement shape.
#[derive(Debug, Clone)]
struct ShapeStats {
    count: u64,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl ShapeStats {
    fn new(duration: Duration) -> Self {
        Self {
            count: 1,
            total: duration,
            min: duration,
            max: duration,
        }
    }

    fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total += duration;
        self.min = self.min.min(duration);
        self.max = self.max.max(duration);
    }
}

/// Read-only view of one shape's statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeReport {
    pub shape: String,
    pub count: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub avg_ms: u64,
}

/// Process-wide totals.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub executions: u64,
    pub slow_queries: u64,
    pub distinct_shapes: usize,
}

/// Full read-only snapshot for the observability surface.
#[derive(Debug, Clone, Serialize)]
pub struct QueryStatsReport {
    pub global: GlobalStats,
    pub top_slowest: Vec<ShapeReport>,
    pub top_frequent: Vec<ShapeReport>,
}

/// Per-shape execution statistics registry.
pub struct QueryStatsRegistry {
    shapes: DashMap<String, ShapeStats>,
    slow_threshold: Duration,
    executions: AtomicU64,
    slow_queries: AtomicU64,
}

impl QueryStatsRegistry {
    pub fn new(settings: &MonitorSettings) -> Self {
        Self {
            shapes: DashMap::new(),
            slow_threshold: Duration::from_millis(settings.slow_query_threshold_ms),
            executions: AtomicU64::new(0),
            slow_queries: AtomicU64::new(0),
        }
    }

    /// Record one execution of a normalized statement shape.
    pub fn observe(&self, shape: &str, duration: Duration) {
        self.executions.fetch_add(1, Ordering::Relaxed);

        self.shapes
            .entry(shape.to_string())
            .and_modify(|stats| stats.record(duration))
            .or_insert_with(|| ShapeStats::new(duration));

        histogram!("tally_query_duration_seconds").record(duration.as_secs_f64());

        if duration >= self.slow_threshold {
            self.slow_queries.fetch_add(1, Ordering::Relaxed);
            counter!("tally_slow_queries_total").increment(1);
            log::warn!(
                "slow query ({}ms >= {}ms): {}",
                duration.as_millis(),
                self.slow_threshold.as_millis(),
                shape
            );
        }
    }

    /// The `n` shapes with the highest observed maximum duration.
    pub fn top_slowest(&self, n: usize) -> Vec<ShapeReport> {
        let mut reports = self.all_reports();
        reports.sort_by(|a, b| b.max_ms.cmp(&a.max_ms).then_with(|| a.shape.cmp(&b.shape)));
        reports.truncate(n);
        reports
    }

    /// The `n` most frequently executed shapes.
    pub fn top_frequent(&self, n: usize) -> Vec<ShapeReport> {
        let mut reports = self.all_reports();
        reports.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.shape.cmp(&b.shape)));
        reports.truncate(n);
        reports
    }

    pub fn global(&self) -> GlobalStats {
        GlobalStats {
            executions: self.executions.load(Ordering::Relaxed),
            slow_queries: self.slow_queries.load(Ordering::Relaxed),
            distinct_shapes: self.shapes.len(),
        }
    }

    /// Point-in-time report for the observability surface.
    pub fn report(&self) -> QueryStatsReport {
        QueryStatsReport {
            global: self.global(),
            top_slowest: self.top_slowest(10),
            top_frequent: self.top_frequent(10),
        }
    }

    /// Clear all statistics.
    pub fn reset(&self) {
        self.shapes.clear();
        self.executions.store(0, Ordering::Relaxed);
        self.slow_queries.store(0, Ordering::Relaxed);
    }

    fn all_reports(&self) -> Vec<ShapeReport> {
        self.shapes
            .iter()
            .map(|entry| {
                let stats = entry.value();
                ShapeReport {
                    shape: entry.key().clone(),
                    count: stats.count,
                    min_ms: stats.min.as_millis() as u64,
                    max_ms: stats.max.as_millis() as u64,
                    avg_ms: (stats.total.as_millis() / stats.count as u128) as u64,
                }
            })
            .collect()
    }
}
