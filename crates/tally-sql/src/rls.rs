//! Row-level-security predicate injection.
//!
//! Scope is resolved by an upstream collaborator and passed in per
//! request, never looked up or cached here. The produced fragment is
//! ANDed into the WHERE clause at build time, before the safety
//! validator runs.

use crate::schema::escape_literal;
use std::collections::BTreeSet;

/// The set of scoping values a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlsScope {
    /// Wildcard scope: the caller sees every row.
    Unrestricted,
    /// The caller sees only rows whose scoping column value is in the set.
    Stores(BTreeSet<String>),
}

impl RlsScope {
    /// Build a scope from the raw value set the resolver supplies.
    /// A `*` anywhere in the set means unrestricted.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for value in values {
            let value = value.into();
            if value == "*" {
                return RlsScope::Unrestricted;
            }
            set.insert(value);
        }
        RlsScope::Stores(set)
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, RlsScope::Unrestricted)
    }

    /// Whether a scoping value is visible under this scope.
    pub fn contains(&self, value: &str) -> bool {
        match self {
            RlsScope::Unrestricted => true,
            RlsScope::Stores(set) => set.contains(value),
        }
    }
}

/// Produce the WHERE fragment enforcing a scope on `column`.
///
/// Wildcard yields an always-true fragment. An empty non-wildcard scope
/// yields an always-false fragment: the caller sees zero rows and the
/// truth gate turns that into a deterministic no-data answer.
pub fn predicate_for(scope: &RlsScope, column: &str) -> String {
    match scope {
        RlsScope::Unrestricted => "1 = 1".to_string(),
        RlsScope::Stores(values) if values.is_empty() => "1 = 0".to_string(),
        RlsScope::Stores(values) => {
            let rendered: Vec<String> = values
                .iter()
                .map(|v| {
                    if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) {
                        v.clone()
                    } else {
                        format!("'{}'", escape_literal(v))
                    }
                })
                .collect();
            format!("{} IN ({})", column, rendered.join(", "))
        }
    }
}
