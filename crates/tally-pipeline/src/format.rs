//! Fixed per-metric formatters for context rendering.

/// How a metric renders in the key-metrics block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Currency,
    Count,
    Percentage,
}

/// Fixed mapping from metric name to formatter. Unknown names fall back
/// to a plain two-decimal rendering.
fn kind_for(name: &str) -> Option<MetricKind> {
    match name {
        "total_sales" | "avg_sales" => Some(MetricKind::Currency),
        "distinct_skus" | "distinct_stores" | "stockout_skus" | "total_units" => {
            Some(MetricKind::Count)
        }
        _ if name.ends_with("_pct") => Some(MetricKind::Percentage),
        _ => None,
    }
}

/// Format a metric value with its fixed formatter.
pub fn format_metric(name: &str, value: f64) -> String {
    match kind_for(name) {
        Some(MetricKind::Currency) => format!("${:.2}", value),
        Some(MetricKind::Count) => format!("{:.0}", value),
        Some(MetricKind::Percentage) => format!("{:.1}%", value),
        None => format!("{:.2}", value),
    }
}

/// Human label for a metric name: underscores to spaces.
pub fn metric_label(name: &str) -> String {
    name.replace('_', " ")
}

/// Capitalize the first character, for sentence-position dimension names.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
