//! Per-intent aggregation query templates.
//!
//! Each intent type maps to one fixed statement shape: a scoped CTE that
//! applies the RLS fragment, the entity predicates, and the baseline
//! sanity predicate, UNION-ALLed with nested top-N sub-selections so one
//! engine round trip returns totals, detail rows, and segment rows
//! together.
//!
//! Row protocol shared with the result shaper: every branch projects
//! `section, item_key, item_label, <metric columns>, rank_value,
//! row_count`. The totals branch carries the metric values and the base
//! row count; detail branches carry `rank_value` and NULL-pad the rest.

use crate::models::BuiltQuery;
use crate::rls::{predicate_for, RlsScope};
use crate::safety::{SafeQuery, SqlSafetyValidator};
use crate::schema::{self, columns, render_literal, Dimension, SCOPE_COLUMN};
use tally_commons::config::QuerySettings;
use tally_commons::models::intent::{EntityValue, Intent, IntentType};
use tally_commons::{PipelineError, Result};

/// Row cap for the top-N detail sub-selection.
const DIMENSION_ROWS: usize = 10;
/// Row cap for the top-N-by-segment sub-selection.
const SEGMENT_ROWS: usize = 5;

/// Builds one validated aggregation query per intent.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    validator: SqlSafetyValidator,
}

impl QueryBuilder {
    pub fn new(settings: &QuerySettings) -> Self {
        Self {
            validator: SqlSafetyValidator::new(settings),
        }
    }

    /// Turn an intent into a safety-validated statement against `table`.
    pub fn build(&self, intent: &Intent, scope: &RlsScope, table: &str) -> Result<SafeQuery> {
        let where_clause = where_clause(intent, scope)?;

        let sql = match intent.intent_type {
            IntentType::Sales => sales_sql(table, &where_clause),
            IntentType::Inventory => inventory_sql(table, &where_clause, intent),
            IntentType::Stockout => stockout_sql(table, &where_clause),
            IntentType::Comparison => comparison_sql(table, &where_clause),
            IntentType::Generic => generic_sql(table, &where_clause),
        };

        log::debug!(
            "built {} query against {}: {}",
            intent.intent_type.as_str(),
            table,
            sql
        );

        self.validator.validate(BuiltQuery::new(sql, table))
    }
}

/// Assemble the WHERE clause: RLS fragment first, one predicate per
/// present entity, then the intent's baseline sanity predicate.
fn where_clause(intent: &Intent, scope: &RlsScope) -> Result<String> {
    let mut parts = vec![predicate_for(scope, SCOPE_COLUMN)];

    for (entity, value) in &intent.entities {
        let dim = schema::dimension(entity).ok_or_else(|| {
            PipelineError::validation(format!("unknown filter dimension '{}'", entity))
        })?;
        parts.push(entity_predicate(dim, value)?);
    }

    if let Some(baseline) = baseline_predicate(intent.intent_type) {
        parts.push(baseline.to_string());
    }

    Ok(parts.join(" AND "))
}

/// Baseline predicate the metric requires, if any.
fn baseline_predicate(intent_type: IntentType) -> Option<&'static str> {
    match intent_type {
        IntentType::Sales | IntentType::Comparison => Some("sales_30d > 0"),
        IntentType::Stockout => Some("stockout_days > 0"),
        IntentType::Inventory | IntentType::Generic => None,
    }
}

/// Render one entity into a predicate. Every value passes the dimension's
/// shape check before it is embedded; list values expand element by
/// element under the same check.
fn entity_predicate(dim: &Dimension, value: &EntityValue) -> Result<String> {
    for v in value.values() {
        dim.shape.check(v).map_err(|reason| {
            PipelineError::validation(format!(
                "invalid value for dimension '{}': {}",
                dim.entity, reason
            ))
        })?;
    }

    match value {
        EntityValue::Single(v) => Ok(format!("{} = {}", dim.column, render_literal(dim.shape, v))),
        EntityValue::Many(vs) if vs.is_empty() => Err(PipelineError::validation(format!(
            "dimension '{}' has an empty value list",
            dim.entity
        ))),
        EntityValue::Many(vs) => {
            let rendered: Vec<String> =
                vs.iter().map(|v| render_literal(dim.shape, v)).collect();
            Ok(format!("{} IN ({})", dim.column, rendered.join(", ")))
        }
    }
}

/// Totals branch: the metric aggregates plus `COUNT(*) AS row_count`.
fn totals_branch(metrics: &[(&str, &str)]) -> String {
    let rendered: Vec<String> = metrics
        .iter()
        .map(|(expr, alias)| format!("CAST({} AS DOUBLE) AS {}", expr, alias))
        .collect();
    format!(
        "SELECT 'totals' AS section, CAST(NULL AS VARCHAR) AS item_key, \
         CAST(NULL AS VARCHAR) AS item_label, {}, \
         CAST(NULL AS DOUBLE) AS rank_value, COUNT(*) AS row_count FROM scoped",
        rendered.join(", ")
    )
}

/// A nested top-N sub-selection projecting the shared row protocol.
#[allow(clippy::too_many_arguments)]
fn detail_branch(
    section: &str,
    key_expr: &str,
    label_expr: &str,
    metric_aliases: &[(&str, &str)],
    rank_expr: &str,
    group_by: &str,
    order_by: &str,
    limit: usize,
) -> String {
    let nulls: Vec<String> = metric_aliases
        .iter()
        .map(|(_, alias)| format!("CAST(NULL AS DOUBLE) AS {}", alias))
        .collect();
    format!(
        "SELECT * FROM (SELECT '{}' AS section, {} AS item_key, {} AS item_label, {}, \
         CAST({} AS DOUBLE) AS rank_value, CAST(NULL AS BIGINT) AS row_count \
         FROM scoped GROUP BY {} ORDER BY {} LIMIT {})",
        section,
        key_expr,
        label_expr,
        nulls.join(", "),
        rank_expr,
        group_by,
        order_by,
        limit
    )
}

/// Presentation order over the whole union. The inner sub-selections pick
/// the top-N rows; this outer ORDER BY fixes the row order the engine
/// returns them in, which union branches alone do not guarantee.
const RANKED_ORDER: &str = "section ASC, rank_value DESC, item_key ASC";

fn with_scoped(table: &str, where_clause: &str, branches: &[String], order_by: &str) -> String {
    format!(
        "WITH scoped AS (SELECT * FROM {} WHERE {}) {} ORDER BY {}",
        table,
        where_clause,
        branches.join(" UNION ALL "),
        order_by
    )
}

fn sales_sql(table: &str, where_clause: &str) -> String {
    let sum = format!("SUM({})", columns::SALES_30D);
    let avg = format!("AVG({})", columns::SALES_30D);
    let cnt = format!("COUNT(DISTINCT {})", columns::SKU);
    let metrics: &[(&str, &str)] = &[
        (sum.as_str(), "total_sales"),
        (avg.as_str(), "avg_sales"),
        (cnt.as_str(), "distinct_skus"),
    ];

    let branches = vec![
        totals_branch(metrics),
        detail_branch(
            "dimension",
            columns::SKU,
            &format!("MIN({})", columns::PRODUCT_NAME),
            metrics,
            &format!("SUM({})", columns::SALES_30D),
            columns::SKU,
            "rank_value DESC, item_key ASC",
            DIMENSION_ROWS,
        ),
        detail_branch(
            "segment",
            columns::CATEGORY,
            "CAST(NULL AS VARCHAR)",
            metrics,
            &format!("SUM({})", columns::SALES_30D),
            columns::CATEGORY,
            "rank_value DESC, item_key ASC",
            SEGMENT_ROWS,
        ),
    ];

    with_scoped(table, where_clause, &branches, RANKED_ORDER)
}

fn inventory_sql(table: &str, where_clause: &str, intent: &Intent) -> String {
    let sum = format!("SUM({})", columns::STOCK_QTY);
    let avg = format!("AVG({})", columns::STOCK_QTY);
    let cnt = format!("COUNT(DISTINCT {})", columns::SKU);
    let metrics: &[(&str, &str)] = &[
        (sum.as_str(), "total_units"),
        (avg.as_str(), "avg_units"),
        (cnt.as_str(), "distinct_skus"),
    ];

    // With an explicit category filter the breakdown drops to SKU level,
    // ordered ascending on the identifier.
    let (dimension, order_by) = if intent.entities.contains_key("category") {
        (
            detail_branch(
                "dimension",
                columns::SKU,
                &format!("MIN({})", columns::PRODUCT_NAME),
                metrics,
                &format!("SUM({})", columns::STOCK_QTY),
                columns::SKU,
                "item_key ASC",
                DIMENSION_ROWS,
            ),
            "section ASC, item_key ASC",
        )
    } else {
        (
            detail_branch(
                "dimension",
                columns::CATEGORY,
                "CAST(NULL AS VARCHAR)",
                metrics,
                &format!("SUM({})", columns::STOCK_QTY),
                columns::CATEGORY,
                "rank_value DESC, item_key ASC",
                DIMENSION_ROWS,
            ),
            RANKED_ORDER,
        )
    };

    let branches = vec![totals_branch(metrics), dimension];
    with_scoped(table, where_clause, &branches, order_by)
}

fn stockout_sql(table: &str, where_clause: &str) -> String {
    let cnt = format!("COUNT(DISTINCT {})", columns::SKU);
    let avg = format!("AVG({})", columns::STOCKOUT_DAYS);
    let max = format!("MAX({})", columns::STOCKOUT_DAYS);
    let metrics: &[(&str, &str)] = &[
        (cnt.as_str(), "stockout_skus"),
        (avg.as_str(), "avg_stockout_days"),
        (max.as_str(), "max_stockout_days"),
    ];

    let branches = vec![
        totals_branch(metrics),
        detail_branch(
            "dimension",
            columns::SKU,
            &format!("MIN({})", columns::PRODUCT_NAME),
            metrics,
            &format!("MAX({})", columns::STOCKOUT_DAYS),
            columns::SKU,
            "rank_value DESC, item_key ASC",
            DIMENSION_ROWS,
        ),
    ];

    with_scoped(table, where_clause, &branches, RANKED_ORDER)
}

fn comparison_sql(table: &str, where_clause: &str) -> String {
    let sum = format!("SUM({})", columns::SALES_30D);
    let avg = format!("AVG({})", columns::SALES_30D);
    let cnt = format!("COUNT(DISTINCT {})", columns::STORE_ID);
    let metrics: &[(&str, &str)] = &[
        (sum.as_str(), "total_sales"),
        (avg.as_str(), "avg_sales"),
        (cnt.as_str(), "distinct_stores"),
    ];

    let branches = vec![
        totals_branch(metrics),
        detail_branch(
            "dimension",
            columns::CATEGORY,
            "CAST(NULL AS VARCHAR)",
            metrics,
            &format!("SUM({})", columns::SALES_30D),
            columns::CATEGORY,
            "rank_value DESC, item_key ASC",
            DIMENSION_ROWS,
        ),
        detail_branch(
            "segment",
            &format!("CAST({} AS VARCHAR)", columns::STORE_ID),
            "CAST(NULL AS VARCHAR)",
            metrics,
            &format!("SUM({})", columns::SALES_30D),
            columns::STORE_ID,
            "rank_value DESC, item_key ASC",
            SEGMENT_ROWS,
        ),
    ];

    with_scoped(table, where_clause, &branches, RANKED_ORDER)
}

fn generic_sql(table: &str, where_clause: &str) -> String {
    let sum = format!("SUM({})", columns::SALES_30D);
    let skus = format!("COUNT(DISTINCT {})", columns::SKU);
    let stores = format!("COUNT(DISTINCT {})", columns::STORE_ID);
    let metrics: &[(&str, &str)] = &[
        (sum.as_str(), "total_sales"),
        (skus.as_str(), "distinct_skus"),
        (stores.as_str(), "distinct_stores"),
    ];

    with_scoped(table, where_clause, &[totals_branch(metrics)], RANKED_ORDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::find_mutating_keyword;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(&QuerySettings::default())
    }

    fn sales_intent() -> Intent {
        Intent::new(IntentType::Sales)
            .with_entity("store", EntityValue::Single("1685".to_string()))
    }

    #[test]
    fn test_sales_query_shape() {
        let safe = builder()
            .build(&sales_intent(), &RlsScope::Unrestricted, "snap_current")
            .unwrap();

        let sql = safe.sql();
        assert!(sql.contains("store_id = 1685"));
        assert!(sql.contains("sales_30d > 0"));
        assert!(sql.contains("'totals' AS section"));
        assert!(sql.contains("'dimension' AS section"));
        assert!(sql.contains("'segment' AS section"));
        assert!(sql.contains("COUNT(*) AS row_count"));
        assert!(sql.ends_with("LIMIT 500"));
    }

    #[test]
    fn test_generated_sql_has_no_mutating_keywords() {
        for intent_type in [
            IntentType::Sales,
            IntentType::Inventory,
            IntentType::Stockout,
            IntentType::Comparison,
            IntentType::Generic,
        ] {
            let intent = Intent::new(intent_type)
                .with_entity("store", EntityValue::Single("7".to_string()));
            let safe = builder()
                .build(&intent, &RlsScope::Unrestricted, "snap_current")
                .unwrap();
            assert_eq!(find_mutating_keyword(safe.sql()), None, "{:?}", intent_type);
        }
    }

    #[test]
    fn test_rls_fragment_is_injected() {
        let scope = RlsScope::from_values(vec!["1685", "2001"]);
        let safe = builder()
            .build(&Intent::new(IntentType::Sales), &scope, "snap_current")
            .unwrap();
        assert!(safe.sql().contains("store_id IN (1685, 2001)"));
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let intent = Intent::new(IntentType::Sales)
            .with_entity("password", EntityValue::Single("x".to_string()));
        let err = builder()
            .build(&intent, &RlsScope::Unrestricted, "snap_current")
            .unwrap_err();
        assert!(err.to_string().contains("unknown filter dimension"));
    }

    #[test]
    fn test_malformed_value_rejected() {
        let intent = Intent::new(IntentType::Sales)
            .with_entity("store", EntityValue::Single("1; DROP TABLE t".to_string()));
        let err = builder()
            .build(&intent, &RlsScope::Unrestricted, "snap_current")
            .unwrap_err();
        assert!(err.to_string().contains("invalid value"));
    }

    #[test]
    fn test_list_values_expand_element_by_element() {
        let intent = Intent::new(IntentType::Sales).with_entity(
            "category",
            EntityValue::Many(vec!["Dairy".to_string(), "Bakery".to_string()]),
        );
        let safe = builder()
            .build(&intent, &RlsScope::Unrestricted, "snap_current")
            .unwrap();
        assert!(safe.sql().contains("category IN ('Dairy', 'Bakery')"));
    }

    #[test]
    fn test_list_with_one_bad_element_rejected() {
        let intent = Intent::new(IntentType::Sales).with_entity(
            "category",
            EntityValue::Many(vec!["Dairy".to_string(), "x'); DROP--".to_string()]),
        );
        assert!(builder()
            .build(&intent, &RlsScope::Unrestricted, "snap_current")
            .is_err());
    }

    #[test]
    fn test_inventory_breakdown_switches_on_category_filter() {
        let by_category = builder()
            .build(
                &Intent::new(IntentType::Inventory),
                &RlsScope::Unrestricted,
                "snap_current",
            )
            .unwrap();
        assert!(by_category.sql().contains("GROUP BY category"));

        let by_sku = builder()
            .build(
                &Intent::new(IntentType::Inventory)
                    .with_entity("category", EntityValue::Single("Dairy".to_string())),
                &RlsScope::Unrestricted,
                "snap_current",
            )
            .unwrap();
        assert!(by_sku.sql().contains("GROUP BY sku"));
        assert!(by_sku.sql().contains("ORDER BY item_key ASC"));
    }

    #[test]
    fn test_stockout_uses_baseline_predicate() {
        let safe = builder()
            .build(
                &Intent::new(IntentType::Stockout),
                &RlsScope::Unrestricted,
                "snap_current",
            )
            .unwrap();
        assert!(safe.sql().contains("stockout_days > 0"));
    }

    #[test]
    fn test_empty_scope_builds_always_false_query() {
        let scope = RlsScope::from_values(Vec::<String>::new());
        let safe = builder()
            .build(&Intent::new(IntentType::Sales), &scope, "snap_current")
            .unwrap();
        assert!(safe.sql().contains("1 = 0"));
    }
}
