//! The Truth Contract gate.
//!
//! No [`MetricsResult`] reaches the context compactor without passing
//! this check: zero matching rows or an invalid metric value stop the
//! pipeline here, so an unguarded downstream generator can never invent
//! numbers when none exist. [`ValidatedMetrics`] has no other
//! constructor.

use tally_commons::models::metrics::MetricsResult;
use tally_commons::models::validation::ValidationReport;
use tally_commons::{PipelineError, Result};

/// A metrics result that has passed the Truth Contract.
#[derive(Debug, Clone)]
pub struct ValidatedMetrics {
    result: MetricsResult,
    report: ValidationReport,
}

impl ValidatedMetrics {
    pub fn result(&self) -> &MetricsResult {
        &self.result
    }

    pub fn warnings(&self) -> &[String] {
        &self.report.warnings
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }
}

/// Validates a [`MetricsResult`] against the Truth Contract.
pub struct TruthContractValidator;

impl TruthContractValidator {
    /// Check order: no-data first, then metric validity, then advisory
    /// warnings. A SUM of 0 over zero rows is still "no data"; literal
    /// metric content never overrides the row count.
    pub fn check(result: MetricsResult) -> Result<ValidatedMetrics> {
        if result.row_count == 0 {
            return Err(PipelineError::no_data(
                "Try broadening the filters or removing one.",
            ));
        }

        for (name, value) in &result.metrics {
            let valid = matches!(value, Some(v) if v.is_finite());
            if !valid {
                log::error!(
                    "metric '{}' is invalid ({:?}) for sql: {}",
                    name,
                    value,
                    result.query_sql
                );
                return Err(PipelineError::invalid_metric(name.clone()));
            }
        }

        let mut report = ValidationReport::valid();
        if result.dimensions.is_empty() {
            report = report.with_warning("result has no dimensional breakdown rows");
        }

        Ok(ValidatedMetrics { result, report })
    }
}
