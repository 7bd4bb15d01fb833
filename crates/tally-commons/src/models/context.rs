//! The bounded textual context handed to the downstream generator.

use serde::{Deserialize, Serialize};

/// A token-budgeted context block built from a validated metrics result.
///
/// Sections render in fixed order, filters first, so a downstream
/// generator cannot lose the constraint in a long context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredContext {
    /// Filters-applied block. Always the first rendered section.
    pub filters_text: String,
    /// One-line summary of intent category and filter set.
    pub summary: String,
    pub key_metrics_text: String,
    /// Bounded details table, present when the intent produces one.
    pub details_table_text: Option<String>,
    pub metadata_text: String,
    /// Approximate token count of the rendered text. Derived from a fixed
    /// characters-per-token constant, not an exact tokenizer.
    pub total_token_estimate: usize,
}

impl StructuredContext {
    /// Render all sections in their fixed order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.filters_text);
        out.push('\n');
        out.push_str(&self.summary);
        out.push('\n');
        out.push_str(&self.key_metrics_text);
        if let Some(details) = &self.details_table_text {
            out.push('\n');
            out.push_str(details);
        }
        out.push('\n');
        out.push_str(&self.metadata_text);
        out
    }
}
