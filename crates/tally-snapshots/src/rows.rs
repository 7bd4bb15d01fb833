//! Arrow RecordBatch to JSON row conversion.
//!
//! The single conversion point between the engine's columnar output and
//! the pipeline's row shaping. Everything downstream consumes
//! [`EngineRows`]; no other module touches Arrow arrays.

use arrow::record_batch::RecordBatch;
use std::collections::HashMap;

/// One result row. The Arrow JSON writer omits NULL fields, so a missing
/// key means the engine returned NULL for that column.
pub type JsonRow = HashMap<String, serde_json::Value>;

/// Engine output: column names from the schema plus the converted rows.
///
/// Column names are carried separately because NULL-valued fields are
/// absent from the rows themselves.
#[derive(Debug, Clone)]
pub struct EngineRows {
    pub columns: Vec<String>,
    pub rows: Vec<JsonRow>,
}

impl EngineRows {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Convert Arrow RecordBatches to JSON rows.
pub fn batches_to_rows(batches: &[RecordBatch]) -> Result<EngineRows, String> {
    if batches.is_empty() {
        return Ok(EngineRows::empty());
    }

    let schema = batches[0].schema();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    let mut rows = Vec::new();
    for batch in batches {
        let mut buf = Vec::new();
        let mut writer = arrow::json::LineDelimitedWriter::new(&mut buf);
        writer.write(batch).map_err(|e| e.to_string())?;
        writer.finish().map_err(|e| e.to_string())?;

        let json_str = String::from_utf8(buf).map_err(|e| e.to_string())?;
        for line in json_str.lines() {
            if !line.is_empty() {
                let row: JsonRow = serde_json::from_str(line).map_err(|e| e.to_string())?;
                rows.push(row);
            }
        }
    }

    Ok(EngineRows { columns, rows })
}
