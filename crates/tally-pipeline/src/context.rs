//! Context compaction: a validated metrics result becomes the bounded
//! text block handed to the downstream generator.
//!
//! Section order is fixed and filters render first, so the generator
//! cannot lose the active constraints in a long context. Only
//! [`ValidatedMetrics`] is accepted; there is no path from an unchecked
//! result to a context block.

use crate::format::{capitalize, format_metric, metric_label};
use crate::truth::ValidatedMetrics;
use tally_commons::config::ContextSettings;
use tally_commons::models::context::StructuredContext;
use tally_commons::models::intent::{Intent, IntentType};
use tally_commons::models::metrics::MetricsResult;

pub struct ContextCompactor {
    details_row_cap: usize,
    chars_per_token: usize,
}

impl ContextCompactor {
    pub fn new(settings: &ContextSettings) -> Self {
        Self {
            details_row_cap: settings.details_row_cap,
            chars_per_token: settings.chars_per_token,
        }
    }

    /// Build the context block. Sections: filters, summary, key metrics,
    /// optional details table, metadata.
    pub fn build(&self, validated: &ValidatedMetrics, intent: &Intent) -> StructuredContext {
        let result = validated.result();

        let mut context = StructuredContext {
            filters_text: filters_section(intent),
            summary: summary_section(intent, result),
            key_metrics_text: key_metrics_section(result),
            details_table_text: self.details_section(intent, result),
            metadata_text: metadata_section(result),
            total_token_estimate: 0,
        };

        // Approximate by construction: rendered length over a fixed
        // characters-per-token constant, not an exact tokenizer.
        context.total_token_estimate = context.render().len().div_ceil(self.chars_per_token);
        context
    }

    fn details_section(&self, intent: &Intent, result: &MetricsResult) -> Option<String> {
        if result.dimensions.is_empty() && result.segments.is_empty() {
            return None;
        }

        let (dimension_heading, segment_heading) = match intent.intent_type {
            IntentType::Sales => ("Top products by sales:", "Sales by category:"),
            IntentType::Inventory => ("Stock breakdown:", "Stock by segment:"),
            IntentType::Stockout => ("Longest stockouts:", "Stockouts by segment:"),
            IntentType::Comparison => ("Top categories:", "Sales by store:"),
            IntentType::Generic => ("Detail rows:", "Segments:"),
        };

        let mut lines = Vec::new();

        if !result.dimensions.is_empty() {
            lines.push(dimension_heading.to_string());
            for (i, row) in result.dimensions.iter().take(self.details_row_cap).enumerate() {
                let name = match &row.label {
                    Some(label) => format!("{} [{}]", label, row.key),
                    None => row.key.clone(),
                };
                lines.push(format!(
                    "{}. {}: {}",
                    i + 1,
                    name,
                    detail_value(intent.intent_type, row.value)
                ));
            }
        }

        if !result.segments.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(segment_heading.to_string());
            for row in result.segments.iter().take(self.details_row_cap) {
                lines.push(format!(
                    "- {}: {}",
                    row.segment,
                    detail_value(intent.intent_type, row.value)
                ));
            }
        }

        Some(lines.join("\n"))
    }
}

fn filters_section(intent: &Intent) -> String {
    if intent.entities.is_empty() {
        return "Filters applied: none".to_string();
    }

    let mut lines = vec!["Filters applied:".to_string()];
    for (dimension, value) in &intent.entities {
        lines.push(format!("- {}: {}", dimension, value.display()));
    }
    lines.join("\n")
}

fn summary_section(intent: &Intent, result: &MetricsResult) -> String {
    let label = match intent.intent_type {
        IntentType::Sales => "Sales summary",
        IntentType::Inventory => "Inventory position",
        IntentType::Stockout => "Stockout report",
        IntentType::Comparison => "Store comparison",
        IntentType::Generic => "Data summary",
    };

    let filter_phrase = if intent.entities.is_empty() {
        "all stores".to_string()
    } else {
        intent
            .entities
            .iter()
            .map(|(dimension, value)| format!("{} {}", capitalize(dimension), value.display()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!("{} for {} ({} rows)", label, filter_phrase, result.row_count)
}

fn key_metrics_section(result: &MetricsResult) -> String {
    let mut lines = vec!["Key metrics:".to_string()];
    for (name, value) in &result.metrics {
        if let Some(value) = value {
            lines.push(format!(
                "- {}: {}",
                metric_label(name),
                format_metric(name, *value)
            ));
        }
    }
    lines.join("\n")
}

fn metadata_section(result: &MetricsResult) -> String {
    let filters = if result.metadata.applied_filters.is_empty() {
        "none".to_string()
    } else {
        result
            .metadata
            .applied_filters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    };

    format!(
        "Metadata: snapshot={} rows={} execution_time_ms={} filters={}",
        result.metadata.snapshot, result.row_count, result.execution_time_ms, filters
    )
}

fn detail_value(intent_type: IntentType, value: f64) -> String {
    match intent_type {
        IntentType::Sales | IntentType::Comparison => format!("${:.2}", value),
        IntentType::Inventory => format!("{:.0} units", value),
        IntentType::Stockout => format!("{:.0} days", value),
        IntentType::Generic => format!("{:.2}", value),
    }
}
