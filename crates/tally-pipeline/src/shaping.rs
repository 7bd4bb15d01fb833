//! Result shaping: engine rows to a typed [`MetricsResult`].
//!
//! The builder's templates all project the same row protocol
//! (`section, item_key, item_label, <metric columns>, rank_value,
//! row_count`), so one shaper covers every intent. Any column that is
//! not a protocol column is a metric; the totals row carries metric
//! values and the base row count, detail rows carry their rank value.

use chrono::Utc;
use std::collections::BTreeMap;
use tally_commons::models::intent::Intent;
use tally_commons::models::metrics::{DimensionRow, MetricsResult, ResultMetadata, SegmentRow};
use tally_commons::{PipelineError, Result};
use tally_snapshots::rows::{EngineRows, JsonRow};

const PROTOCOL_COLUMNS: [&str; 5] = ["section", "item_key", "item_label", "rank_value", "row_count"];

/// Shape engine output into a [`MetricsResult`].
///
/// The Arrow JSON adapter omits NULL fields, so a metric column missing
/// from the totals row records as `None`.
pub fn shape_result(
    rows: &EngineRows,
    intent: &Intent,
    snapshot: &str,
    sql: &str,
    execution_time_ms: u64,
) -> Result<MetricsResult> {
    let metric_columns: Vec<&str> = rows
        .columns
        .iter()
        .map(|c| c.as_str())
        .filter(|c| !PROTOCOL_COLUMNS.contains(c))
        .collect();

    let mut metrics: BTreeMap<String, Option<f64>> = BTreeMap::new();
    let mut dimensions = Vec::new();
    let mut segments = Vec::new();
    let mut row_count = 0u64;
    let mut saw_totals = false;

    for row in &rows.rows {
        match row.get("section").and_then(|v| v.as_str()) {
            Some("totals") => {
                saw_totals = true;
                row_count = row.get("row_count").and_then(|v| v.as_u64()).unwrap_or(0);
                for column in &metric_columns {
                    metrics.insert(
                        (*column).to_string(),
                        row.get(*column).and_then(|v| v.as_f64()),
                    );
                }
            }
            Some("dimension") => dimensions.push(DimensionRow {
                key: string_field(row, "item_key"),
                label: row
                    .get("item_label")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                value: row.get("rank_value").and_then(|v| v.as_f64()).unwrap_or(0.0),
            }),
            Some("segment") => segments.push(SegmentRow {
                segment: string_field(row, "item_key"),
                value: row.get("rank_value").and_then(|v| v.as_f64()).unwrap_or(0.0),
            }),
            other => {
                log::debug!("ignoring row with unexpected section {:?}", other);
            }
        }
    }

    if !saw_totals {
        return Err(PipelineError::execution("result is missing its totals row", sql));
    }

    let applied_filters: BTreeMap<String, String> = intent
        .entities
        .iter()
        .map(|(dimension, value)| (dimension.clone(), value.display()))
        .collect();

    Ok(MetricsResult {
        metrics,
        dimensions,
        segments,
        metadata: ResultMetadata {
            intent_type: intent.intent_type,
            applied_filters,
            snapshot: snapshot.to_string(),
            generated_at: Utc::now(),
        },
        row_count,
        execution_time_ms,
        query_sql: sql.to_string(),
    })
}

fn string_field(row: &JsonRow, field: &str) -> String {
    match row.get(field) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
