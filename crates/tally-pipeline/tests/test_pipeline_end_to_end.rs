//! End-to-end pipeline tests over a real Parquet snapshot.

mod common;

use tally_commons::models::intent::{EntityValue, Intent, IntentType};
use tally_pipeline::{PipelineError, RlsScope};

fn sales_intent() -> Intent {
    Intent::new(IntentType::Sales)
        .with_entity("store", EntityValue::Single("1685".to_string()))
        .with_entity("category", EntityValue::Single("Dairy".to_string()))
}

#[tokio::test]
async fn test_sales_end_to_end() {
    let (_dir, pipeline) = common::pipeline();

    let context = pipeline
        .compute_metrics(&sales_intent(), &RlsScope::Unrestricted)
        .await
        .unwrap();

    // Filters render first.
    let rendered = context.render();
    assert!(rendered.starts_with("Filters applied:"));
    assert!(context.filters_text.contains("- store: 1685"));
    assert!(context.filters_text.contains("- category: Dairy"));

    // Summary names the store; two Dairy rows match at store 1685.
    assert!(context.summary.contains("Store 1685"));
    assert!(context.summary.contains("2 rows"));

    // 100000.25 + 50234.25, preserved to two decimals.
    assert!(context.key_metrics_text.contains("$150234.50"));

    // Top product and segment detail from the same round trip.
    let details = context.details_table_text.as_deref().unwrap();
    assert!(details.contains("Whole Milk 1L [SKU-1]: $100000.25"));
    assert!(details.contains("Sales by category:"));

    assert!(context.total_token_estimate > 0);
}

#[tokio::test]
async fn test_no_matching_rows_is_no_data() {
    let (_dir, pipeline) = common::pipeline();

    let intent = Intent::new(IntentType::Sales)
        .with_entity("store", EntityValue::Single("9999".to_string()));

    let err = pipeline
        .compute_metrics(&intent, &RlsScope::Unrestricted)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoData { .. }));
    assert!(err.is_user_facing());
    assert!(err.to_string().contains("broadening"));
}

#[tokio::test]
async fn test_empty_scope_is_no_data_not_an_error() {
    let (_dir, pipeline) = common::pipeline();

    let scope = RlsScope::from_values(Vec::<String>::new());
    let err = pipeline
        .compute_metrics(&Intent::new(IntentType::Sales), &scope)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoData { .. }));
}

#[tokio::test]
async fn test_same_intent_is_deterministic() {
    let (_dir, pipeline) = common::pipeline();

    let first = pipeline
        .compute_metrics(&sales_intent(), &RlsScope::Unrestricted)
        .await
        .unwrap();
    let second = pipeline
        .compute_metrics(&sales_intent(), &RlsScope::Unrestricted)
        .await
        .unwrap();

    assert_eq!(first.key_metrics_text, second.key_metrics_text);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.details_table_text, second.details_table_text);
}

#[tokio::test]
async fn test_inventory_intent_renders_units() {
    let (_dir, pipeline) = common::pipeline();

    let intent = Intent::new(IntentType::Inventory)
        .with_entity("store", EntityValue::Single("1685".to_string()));
    let context = pipeline
        .compute_metrics(&intent, &RlsScope::Unrestricted)
        .await
        .unwrap();

    assert!(context.summary.contains("Inventory position"));
    assert!(context.key_metrics_text.contains("total units"));
    let details = context.details_table_text.as_deref().unwrap();
    assert!(details.contains("units"));
}

#[tokio::test]
async fn test_stockout_intent_counts_stockouts() {
    let (_dir, pipeline) = common::pipeline();

    let context = pipeline
        .compute_metrics(&Intent::new(IntentType::Stockout), &RlsScope::Unrestricted)
        .await
        .unwrap();

    // Three SKUs have stockout_days > 0 across all stores.
    assert!(context.key_metrics_text.contains("stockout skus: 3"));
    let details = context.details_table_text.as_deref().unwrap();
    assert!(details.contains("Cheddar 500g [SKU-2]: 6 days"));
}

#[tokio::test]
async fn test_malformed_entity_never_reaches_engine() {
    let (_dir, pipeline) = common::pipeline();

    let intent = Intent::new(IntentType::Sales)
        .with_entity("store", EntityValue::Single("1685 OR 1=1".to_string()));
    let err = pipeline
        .compute_metrics(&intent, &RlsScope::Unrestricted)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    // Build-time rejection: the monitor saw no execution.
    assert_eq!(pipeline.performance_snapshot().global.executions, 0);
}
