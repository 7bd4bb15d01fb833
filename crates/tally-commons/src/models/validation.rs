//! Validation outcome reporting.

use serde::{Deserialize, Serialize};

/// Outcome of a validation pass. Produced once, immutable.
///
/// `errors` are blocking; `warnings` are advisory and never stop the
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_invalidate() {
        let report = ValidationReport::valid().with_warning("dimensions empty");
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_invalid_carries_error() {
        let report = ValidationReport::invalid("row_count is zero");
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["row_count is zero".to_string()]);
    }
}
