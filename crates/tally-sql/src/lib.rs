//! SQL layer of the Tally analytics pipeline.
//!
//! Safety validation, row-level-security predicate injection, and the
//! per-intent aggregation query builder. Nothing in this crate touches
//! the engine; it only produces [`safety::SafeQuery`] values for the
//! snapshot crate to execute.

pub mod builder;
pub mod keywords;
pub mod models;
pub mod normalize;
pub mod rls;
pub mod safety;
pub mod schema;

pub use builder::QueryBuilder;
pub use models::BuiltQuery;
pub use normalize::{normalize_sql, query_shape};
pub use rls::{predicate_for, RlsScope};
pub use safety::{SafeQuery, SqlSafetyValidator};
