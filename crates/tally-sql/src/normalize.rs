//! SQL normalization helpers.
//!
//! `normalize_sql` collapses whitespace the same way across the codebase;
//! `query_shape` additionally folds literals so the performance monitor
//! can bucket executions of the same statement shape together.

use once_cell::sync::Lazy;
use regex::Regex;

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'(?:[^']|'')*'").expect("valid literal regex"));

static NUMBER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"));

/// Normalize SQL by removing extra whitespace and trailing semicolons.
///
/// Converts runs of spaces, tabs, and newlines into single spaces.
pub fn normalize_sql(sql: &str) -> String {
    let mut normalized = String::new();
    for part in sql.trim().trim_end_matches(';').split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(part);
    }
    normalized
}

/// Fold a statement to its shape: whitespace-normalized, with string and
/// numeric literals replaced by `?`.
///
/// Two executions that differ only in embedded values map to the same
/// shape, which is what the stats registry keys on.
pub fn query_shape(sql: &str) -> String {
    let normalized = normalize_sql(sql);
    let without_strings = STRING_LITERAL.replace_all(&normalized, "?");
    NUMBER_LITERAL.replace_all(&without_strings, "?").into_owned()
}
