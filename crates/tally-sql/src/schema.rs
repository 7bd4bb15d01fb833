//! The snapshot's allow-listed columns and filterable dimensions.
//!
//! Every column the builder may reference lives here. Entity values are
//! validated against their dimension's expected shape before they are
//! embedded in SQL.

/// Expected shape of an entity value for a given dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Digits only (store ids). Embedded unquoted.
    NumericId,
    /// SKU-style code: letters, digits, `_`, `-`.
    Code,
    /// Free-text name: letters, digits, spaces, `&`, `-`, `'`.
    Name,
}

impl ValueShape {
    /// Check a single value against this shape.
    pub fn check(self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("value is empty".to_string());
        }

        match self {
            ValueShape::NumericId => {
                if value.len() > 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(format!("'{}' is not a numeric identifier", value));
                }
            }
            ValueShape::Code => {
                if value.len() > 32
                    || !value
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
                {
                    return Err(format!("'{}' is not a valid code", value));
                }
            }
            ValueShape::Name => {
                if value.len() > 64
                    || !value.chars().all(|c| {
                        c.is_ascii_alphanumeric()
                            || c == ' '
                            || c == '&'
                            || c == '-'
                            || c == '\''
                    })
                {
                    return Err(format!("'{}' is not a valid name", value));
                }
            }
        }

        Ok(())
    }
}

/// A filterable dimension: the entity name the classifier emits, the
/// snapshot column it maps to, and the value shape it accepts.
#[derive(Debug, Clone, Copy)]
pub struct Dimension {
    pub entity: &'static str,
    pub column: &'static str,
    pub shape: ValueShape,
}

/// Closed set of filterable dimensions.
pub const DIMENSIONS: &[Dimension] = &[
    Dimension { entity: "store", column: "store_id", shape: ValueShape::NumericId },
    Dimension { entity: "sku", column: "sku", shape: ValueShape::Code },
    Dimension { entity: "category", column: "category", shape: ValueShape::Name },
    Dimension { entity: "brand", column: "brand", shape: ValueShape::Name },
    Dimension { entity: "region", column: "region", shape: ValueShape::Name },
];

/// Column carrying the row-level-security scope (the tenancy dimension).
pub const SCOPE_COLUMN: &str = "store_id";

/// Measure columns the templates aggregate over.
pub mod columns {
    pub const SALES_30D: &str = "sales_30d";
    pub const UNITS_30D: &str = "units_30d";
    pub const STOCK_QTY: &str = "stock_qty";
    pub const STOCKOUT_DAYS: &str = "stockout_days";
    pub const SKU: &str = "sku";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const CATEGORY: &str = "category";
    pub const STORE_ID: &str = "store_id";
}

/// Look up a dimension by the entity name the classifier emits.
pub fn dimension(entity: &str) -> Option<&'static Dimension> {
    DIMENSIONS.iter().find(|d| d.entity == entity)
}

/// Escape a string for embedding as a single-quoted SQL literal.
///
/// Doubles single quotes and drops control characters. Values reaching
/// this point have already passed a shape check; escaping is a second
/// layer, not the first.
pub fn escape_literal(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if c == '\'' {
                "''".to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Render a checked value as a SQL literal for its shape.
pub fn render_literal(shape: ValueShape, value: &str) -> String {
    match shape {
        ValueShape::NumericId => value.to_string(),
        ValueShape::Code | ValueShape::Name => format!("'{}'", escape_literal(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_shape() {
        assert!(ValueShape::NumericId.check("1685").is_ok());
        assert!(ValueShape::NumericId.check("0").is_ok());
        assert!(ValueShape::NumericId.check("16a5").is_err());
        assert!(ValueShape::NumericId.check("1; DROP TABLE t").is_err());
        assert!(ValueShape::NumericId.check("").is_err());
        assert!(ValueShape::NumericId.check("12345678901").is_err());
    }

    #[test]
    fn test_code_shape() {
        assert!(ValueShape::Code.check("SKU-00417").is_ok());
        assert!(ValueShape::Code.check("milk_1l").is_ok());
        assert!(ValueShape::Code.check("bad code").is_err());
        assert!(ValueShape::Code.check("x' OR '1'='1").is_err());
    }

    #[test]
    fn test_name_shape() {
        assert!(ValueShape::Name.check("Dairy & Eggs").is_ok());
        assert!(ValueShape::Name.check("Ben's Bakery").is_ok());
        assert!(ValueShape::Name.check("Robert'); DROP TABLE t;--").is_err());
    }

    #[test]
    fn test_dimension_lookup() {
        let dim = dimension("store").unwrap();
        assert_eq!(dim.column, "store_id");
        assert_eq!(dim.shape, ValueShape::NumericId);
        assert!(dimension("password").is_none());
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("Ben's"), "Ben''s");
        assert_eq!(escape_literal("plain"), "plain");
        assert_eq!(escape_literal("a\nb"), "ab");
    }

    #[test]
    fn test_render_literal() {
        assert_eq!(render_literal(ValueShape::NumericId, "1685"), "1685");
        assert_eq!(render_literal(ValueShape::Name, "Ben's"), "'Ben''s'");
    }
}
