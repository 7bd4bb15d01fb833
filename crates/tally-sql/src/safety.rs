//! SQL safety validation.
//!
//! Every statement bound for the engine passes through
//! [`SqlSafetyValidator::validate`], which is the only constructor of
//! [`SafeQuery`]. The engine's execute surface accepts `&SafeQuery`
//! exclusively, so an unvalidated statement reaching the engine does not
//! typecheck.

use crate::keywords::find_mutating_keyword;
use crate::models::BuiltQuery;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::{Parser, ParserOptions};
use tally_commons::config::QuerySettings;
use tally_commons::{PipelineError, Result};

const SQL_RECURSION_LIMIT: usize = 128;

static TRAILING_LIMIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bLIMIT\s+(\d+)\s*$").expect("valid limit regex"));

/// A statement that has passed safety validation.
///
/// Fields are private; the only way to obtain one is
/// [`SqlSafetyValidator::validate`].
#[derive(Debug, Clone)]
pub struct SafeQuery {
    sql: String,
    table: String,
}

impl SafeQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Classifies candidate statements as allowed or rejected.
///
/// Pure: no side effects, no engine access. A rejection aborts the
/// request before any execution attempt.
#[derive(Debug, Clone)]
pub struct SqlSafetyValidator {
    max_joins: usize,
    default_row_cap: u64,
    row_cap_ceiling: u64,
}

impl SqlSafetyValidator {
    pub fn new(settings: &QuerySettings) -> Self {
        Self {
            max_joins: settings.max_joins,
            default_row_cap: settings.default_row_cap,
            row_cap_ceiling: settings.row_cap_ceiling,
        }
    }

    /// Validate a built statement, consuming it into a [`SafeQuery`].
    pub fn validate(&self, query: BuiltQuery) -> Result<SafeQuery> {
        let sql = query.sql.trim();

        if sql.is_empty() {
            return Err(PipelineError::validation("statement is empty"));
        }

        for marker in ["--", "/*", "#"] {
            if sql.contains(marker) {
                return Err(PipelineError::validation(format!(
                    "statement contains comment marker '{}'",
                    marker
                )));
            }
        }

        // One trailing semicolon is tolerated; anything after it is a
        // second statement.
        let body = sql.trim_end_matches(';');
        if body.contains(';') {
            return Err(PipelineError::validation(
                "statement contains multiple ';'-separated statements",
            ));
        }

        if let Some(keyword) = find_mutating_keyword(body) {
            return Err(PipelineError::validation(format!(
                "mutating keyword {} is not allowed",
                keyword.as_str()
            )));
        }

        let statements = parse_statements(body)?;
        if statements.len() != 1 {
            return Err(PipelineError::validation(format!(
                "expected a single statement, found {}",
                statements.len()
            )));
        }
        if !matches!(statements[0], Statement::Query(_)) {
            return Err(PipelineError::validation(
                "statement is not a SELECT query",
            ));
        }

        let join_count = count_joins(body);
        if join_count > self.max_joins {
            return Err(PipelineError::validation(format!(
                "statement has {} JOINs, maximum is {}",
                join_count, self.max_joins
            )));
        }

        Ok(SafeQuery {
            sql: self.ensure_bounded(body),
            table: query.table,
        })
    }

    /// Append the default row cap when no trailing LIMIT exists, and clamp
    /// a cap above the ceiling down to the ceiling.
    pub fn ensure_bounded(&self, sql: &str) -> String {
        let trimmed = sql.trim().trim_end_matches(';').trim_end();

        if let Some(caps) = TRAILING_LIMIT.captures(trimmed) {
            let cap: u64 = caps[1].parse().unwrap_or(self.row_cap_ceiling);
            if cap > self.row_cap_ceiling {
                return TRAILING_LIMIT
                    .replace(trimmed, format!("LIMIT {}", self.row_cap_ceiling).as_str())
                    .into_owned();
            }
            return trimmed.to_string();
        }

        format!("{} LIMIT {}", trimmed, self.default_row_cap)
    }
}

/// Parse SQL into statements with the shared parser defaults.
fn parse_statements(sql: &str) -> Result<Vec<Statement>> {
    let dialect = GenericDialect {};
    Parser::new(&dialect)
        .with_options(ParserOptions::new().with_trailing_commas(true))
        .with_recursion_limit(SQL_RECURSION_LIMIT)
        .try_with_sql(sql)
        .and_then(|mut p| p.parse_statements())
        .map_err(|e| PipelineError::validation(format!("statement does not parse: {}", e)))
}

/// Count JOIN as a case-insensitive whole word. Counts every join form
/// (INNER, LEFT, CROSS) since each one spells JOIN.
fn count_joins(sql: &str) -> usize {
    sql.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|word| word.eq_ignore_ascii_case("JOIN"))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SqlSafetyValidator {
        SqlSafetyValidator::new(&QuerySettings::default())
    }

    fn built(sql: &str) -> BuiltQuery {
        BuiltQuery::new(sql, "snap_current")
    }

    #[test]
    fn test_plain_select_passes() {
        let safe = validator().validate(built("SELECT store_id FROM snap_current")).unwrap();
        assert_eq!(safe.table(), "snap_current");
        assert!(safe.sql().starts_with("SELECT store_id"));
    }

    #[test]
    fn test_mutating_keywords_rejected() {
        for sql in [
            "DELETE FROM snap_current",
            "DROP TABLE snap_current",
            "INSERT INTO snap_current VALUES (1)",
            "SELECT * FROM t WHERE x = 'a' UNION ALL SELECT * FROM t2; TRUNCATE t2",
            "PRAGMA table_info(snap_current)",
        ] {
            let err = validator().validate(built(sql)).unwrap_err();
            assert!(matches!(err, PipelineError::Validation(_)), "{} passed", sql);
        }
    }

    #[test]
    fn test_comment_markers_rejected() {
        assert!(validator().validate(built("SELECT 1 -- hidden")).is_err());
        assert!(validator().validate(built("SELECT /* x */ 1")).is_err());
    }

    #[test]
    fn test_second_statement_rejected() {
        assert!(validator()
            .validate(built("SELECT 1; SELECT 2"))
            .is_err());
        // A single trailing semicolon is fine.
        assert!(validator().validate(built("SELECT 1;")).is_ok());
    }

    #[test]
    fn test_non_query_rejected() {
        let err = validator().validate(built("SHOW TABLES")).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_union_and_cte_are_one_statement() {
        let sql = "WITH scoped AS (SELECT * FROM snap_current) \
                   SELECT 1 FROM scoped UNION ALL SELECT 2 FROM scoped";
        assert!(validator().validate(built(sql)).is_ok());
    }

    #[test]
    fn test_join_cap() {
        let ok = "SELECT * FROM a JOIN b ON a.x = b.x JOIN c ON b.y = c.y JOIN d ON c.z = d.z";
        assert!(validator().validate(built(ok)).is_ok());

        let too_many = "SELECT * FROM a JOIN b ON a.x = b.x JOIN c ON b.y = c.y \
                        JOIN d ON c.z = d.z JOIN e ON d.w = e.w";
        let err = validator().validate(built(too_many)).unwrap_err();
        assert!(err.to_string().contains("4 JOINs"));
    }

    #[test]
    fn test_ensure_bounded_appends_default_cap() {
        let bounded = validator().ensure_bounded("SELECT * FROM snap_current");
        assert_eq!(bounded, "SELECT * FROM snap_current LIMIT 500");
    }

    #[test]
    fn test_ensure_bounded_clamps_to_ceiling() {
        let bounded = validator().ensure_bounded("SELECT * FROM snap_current LIMIT 1000");
        assert_eq!(bounded, "SELECT * FROM snap_current LIMIT 500");
    }

    #[test]
    fn test_ensure_bounded_keeps_cap_under_ceiling() {
        let bounded = validator().ensure_bounded("SELECT * FROM snap_current LIMIT 25");
        assert_eq!(bounded, "SELECT * FROM snap_current LIMIT 25");
    }

    #[test]
    fn test_validate_bounds_the_statement() {
        let safe = validator().validate(built("SELECT sku FROM snap_current")).unwrap();
        assert!(safe.sql().ends_with("LIMIT 500"));
    }
}
