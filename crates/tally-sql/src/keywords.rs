//! Centralized enumeration of mutating and administrative SQL keywords.
//!
//! Provides a strongly-typed representation so the safety validator never
//! duplicates string literals for its deny list.

use std::str::FromStr;

/// Keywords that mutate state or administer the engine. None of these may
/// appear anywhere in a statement bound for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutatingKeyword {
    Delete,
    Drop,
    Truncate,
    Alter,
    Create,
    Update,
    Insert,
    Grant,
    Revoke,
    Exec,
    Pragma,
}

impl MutatingKeyword {
    /// Every keyword on the deny list.
    pub const ALL: [MutatingKeyword; 11] = [
        MutatingKeyword::Delete,
        MutatingKeyword::Drop,
        MutatingKeyword::Truncate,
        MutatingKeyword::Alter,
        MutatingKeyword::Create,
        MutatingKeyword::Update,
        MutatingKeyword::Insert,
        MutatingKeyword::Grant,
        MutatingKeyword::Revoke,
        MutatingKeyword::Exec,
        MutatingKeyword::Pragma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MutatingKeyword::Delete => "DELETE",
            MutatingKeyword::Drop => "DROP",
            MutatingKeyword::Truncate => "TRUNCATE",
            MutatingKeyword::Alter => "ALTER",
            MutatingKeyword::Create => "CREATE",
            MutatingKeyword::Update => "UPDATE",
            MutatingKeyword::Insert => "INSERT",
            MutatingKeyword::Grant => "GRANT",
            MutatingKeyword::Revoke => "REVOKE",
            MutatingKeyword::Exec => "EXEC",
            MutatingKeyword::Pragma => "PRAGMA",
        }
    }
}

impl FromStr for MutatingKeyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DELETE" => Ok(MutatingKeyword::Delete),
            "DROP" => Ok(MutatingKeyword::Drop),
            "TRUNCATE" => Ok(MutatingKeyword::Truncate),
            "ALTER" => Ok(MutatingKeyword::Alter),
            "CREATE" => Ok(MutatingKeyword::Create),
            "UPDATE" => Ok(MutatingKeyword::Update),
            "INSERT" => Ok(MutatingKeyword::Insert),
            "GRANT" => Ok(MutatingKeyword::Grant),
            "REVOKE" => Ok(MutatingKeyword::Revoke),
            "EXEC" => Ok(MutatingKeyword::Exec),
            "PRAGMA" => Ok(MutatingKeyword::Pragma),
            _ => Err(()),
        }
    }
}

/// Scan a statement for mutating keywords as case-insensitive whole words.
///
/// Words are runs of `[A-Za-z0-9_]`, so `created_at` does not match
/// `CREATE`. A quoted value containing `drop table` still trips the scan.
pub fn find_mutating_keyword(sql: &str) -> Option<MutatingKeyword> {
    sql.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|word| !word.is_empty())
        .find_map(|word| MutatingKeyword::from_str(word).ok())
}
