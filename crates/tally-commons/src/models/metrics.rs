//! Typed results of an executed aggregation query.

use crate::models::intent::IntentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One detail row of a dimensional breakdown (e.g. a top-selling product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRow {
    /// Scoping identifier of the row (SKU, store id, category name).
    pub key: String,
    /// Human-readable label when the snapshot carries one.
    pub label: Option<String>,
    /// Ranking aggregate value for this row.
    pub value: f64,
}

/// One per-segment aggregate row (e.g. sales per category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub segment: String,
    pub value: f64,
}

/// Metadata describing how a result was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub intent_type: IntentType,
    /// Dimension name → rendered filter value, in deterministic order.
    pub applied_filters: BTreeMap<String, String>,
    /// Snapshot the query ran against.
    pub snapshot: String,
    pub generated_at: DateTime<Utc>,
}

/// The shaped output of one aggregation query.
///
/// Invariant: `row_count == 0` makes `metrics` untrustworthy regardless of
/// literal content. A SUM over zero rows can still read 0, which is a
/// different fact than "no data"; the Truth Contract validator enforces
/// this before anything reaches the context compactor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Metric name → value. `None` preserves an engine NULL.
    pub metrics: BTreeMap<String, Option<f64>>,
    /// Bounded, ordered detail rows.
    pub dimensions: Vec<DimensionRow>,
    /// Bounded, ordered per-segment aggregates.
    pub segments: Vec<SegmentRow>,
    pub metadata: ResultMetadata,
    /// Number of base rows the aggregation saw after filtering.
    pub row_count: u64,
    pub execution_time_ms: u64,
    pub query_sql: String,
}

impl MetricsResult {
    /// Look up a metric that is present and valid.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied().flatten()
    }
}
