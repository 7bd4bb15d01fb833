//! Query types produced by the builder.

/// A candidate statement assembled by the query builder.
///
/// Not yet safe: a `BuiltQuery` cannot be executed. It must pass through
/// [`crate::safety::SqlSafetyValidator::validate`] to become a
/// [`crate::safety::SafeQuery`], the only type the engine accepts.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    /// Registered in-memory table the statement targets.
    pub table: String,
}

impl BuiltQuery {
    pub fn new(sql: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            table: table.into(),
        }
    }
}
