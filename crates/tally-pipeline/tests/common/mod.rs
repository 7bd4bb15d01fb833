//! Shared fixtures for pipeline integration tests.

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::parquet::arrow::ArrowWriter;
use std::fs::File;
use std::sync::Arc;
use tally_commons::config::PipelineConfig;
use tally_pipeline::AnalyticsPipeline;
use tempfile::TempDir;

struct Row {
    store_id: i64,
    sku: &'static str,
    product_name: &'static str,
    category: &'static str,
    brand: &'static str,
    region: &'static str,
    sales_30d: f64,
    units_30d: i64,
    stock_qty: i64,
    stockout_days: i64,
}

const ROWS: &[Row] = &[
    Row { store_id: 1685, sku: "SKU-1", product_name: "Whole Milk 1L", category: "Dairy", brand: "Dale Farms", region: "North", sales_30d: 100000.25, units_30d: 420, stock_qty: 35, stockout_days: 0 },
    Row { store_id: 1685, sku: "SKU-2", product_name: "Cheddar 500g", category: "Dairy", brand: "Dale Farms", region: "North", sales_30d: 50234.25, units_30d: 210, stock_qty: 0, stockout_days: 6 },
    Row { store_id: 1685, sku: "SKU-3", product_name: "Sourdough Loaf", category: "Bakery", brand: "Hearth", region: "North", sales_30d: 20000.0, units_30d: 800, stock_qty: 12, stockout_days: 0 },
    Row { store_id: 2001, sku: "SKU-1", product_name: "Whole Milk 1L", category: "Dairy", brand: "Dale Farms", region: "South", sales_30d: 90000.0, units_30d: 400, stock_qty: 20, stockout_days: 2 },
    Row { store_id: 2001, sku: "SKU-4", product_name: "Rye Bread", category: "Bakery", brand: "Hearth", region: "South", sales_30d: 15000.0, units_30d: 300, stock_qty: 5, stockout_days: 0 },
    Row { store_id: 3003, sku: "SKU-5", product_name: "Butter 250g", category: "Dairy", brand: "Dale Farms", region: "South", sales_30d: 12000.0, units_30d: 150, stock_qty: 9, stockout_days: 1 },
];

/// Write the standard retail snapshot fixture as `current.parquet`.
pub fn write_snapshot(dir: &std::path::Path) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("store_id", DataType::Int64, false),
        Field::new("sku", DataType::Utf8, false),
        Field::new("product_name", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("brand", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("sales_30d", DataType::Float64, false),
        Field::new("units_30d", DataType::Int64, false),
        Field::new("stock_qty", DataType::Int64, false),
        Field::new("stockout_days", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(ROWS.iter().map(|r| r.store_id))),
            Arc::new(StringArray::from_iter_values(ROWS.iter().map(|r| r.sku))),
            Arc::new(StringArray::from_iter_values(ROWS.iter().map(|r| r.product_name))),
            Arc::new(StringArray::from_iter_values(ROWS.iter().map(|r| r.category))),
            Arc::new(StringArray::from_iter_values(ROWS.iter().map(|r| r.brand))),
            Arc::new(StringArray::from_iter_values(ROWS.iter().map(|r| r.region))),
            Arc::new(Float64Array::from_iter_values(ROWS.iter().map(|r| r.sales_30d))),
            Arc::new(Int64Array::from_iter_values(ROWS.iter().map(|r| r.units_30d))),
            Arc::new(Int64Array::from_iter_values(ROWS.iter().map(|r| r.stock_qty))),
            Arc::new(Int64Array::from_iter_values(ROWS.iter().map(|r| r.stockout_days))),
        ],
    )
    .unwrap();

    let file = File::create(dir.join("current.parquet")).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// A pipeline over a freshly written snapshot. The TempDir must outlive
/// the pipeline.
pub fn pipeline() -> (TempDir, AnalyticsPipeline) {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path());

    let mut config = PipelineConfig::default();
    config.snapshots.snapshot_dir = dir.path().to_str().unwrap().to_string();

    let pipeline = AnalyticsPipeline::new(&config);
    (dir, pipeline)
}
