//! Shared error types for the analytics pipeline.
//!
//! The taxonomy separates operational faults (validation, execution,
//! snapshot, config) from the two data-level outcomes that callers turn
//! into user-facing messages (`NoData`, `InvalidMetric`).

use thiserror::Error;

/// Main error type for the analytics pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Unsafe or malformed SQL. Raised before any engine call.
    #[error("SQL validation failed: {0}")]
    Validation(String),

    /// Engine failure or timeout. Logged with the offending SQL and never
    /// retried: a deterministic read-only snapshot that failed once will
    /// fail identically again.
    #[error("Query execution failed: {message}")]
    Execution { message: String, sql: String },

    /// Zero matching rows. Not a system fault; the caller renders a
    /// deterministic "no data for these filters" message instead of
    /// forwarding anything to a generator.
    #[error("No data matched the requested filters. {suggestion}")]
    NoData { suggestion: String },

    /// A computed metric came back null, NaN, or infinite. A data-quality
    /// or query-construction defect, surfaced generically to the caller.
    #[error("Metric '{metric}' did not produce a valid value")]
    InvalidMetric { metric: String },

    /// Snapshot load or registration failure.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid configuration detected at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Creates a Validation error with a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an Execution error carrying the offending SQL.
    pub fn execution(msg: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Execution {
            message: msg.into(),
            sql: sql.into(),
        }
    }

    /// Creates a NoData error with an actionable suggestion.
    pub fn no_data(suggestion: impl Into<String>) -> Self {
        Self::NoData {
            suggestion: suggestion.into(),
        }
    }

    /// Creates an InvalidMetric error naming the metric.
    pub fn invalid_metric(metric: impl Into<String>) -> Self {
        Self::InvalidMetric {
            metric: metric.into(),
        }
    }

    /// Creates a Snapshot error with a message.
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Creates a Config error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the two kinds the caller is meant to turn into friendly
    /// user messages. Everything else is an operational fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::NoData { .. } | Self::InvalidMetric { .. })
    }
}

/// Result type alias using PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;
