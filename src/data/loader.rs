use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Frame, Series, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row of column names, one listing per row (primary)
/// * `.json`    – records-oriented array of flat objects
/// * `.parquet` – flat scalar columns, as written by pandas/polars
///
/// Cell types are inferred per column; apply a
/// [`Schema`](super::schema::Schema) afterwards to get declared dtypes.
pub fn load_file(path: &Path) -> Result<Frame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Frame> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, field) in record.iter().enumerate() {
            cells[col_idx].push(guess_value(field));
        }
    }

    Ok(frame_from_cells(headers, cells))
}

/// Guess the type of a single text cell.
fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Make": "Honda", "Model": "Civic", "Price": 9000, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Frame> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    // Column set is the union of keys across records so a sparse record
    // cannot silently shorten a column.
    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); columns.len()];
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (col_idx, col) in columns.iter().enumerate() {
            let value = match obj.get(col) {
                Some(v) => json_to_value(v).with_context(|| format!("Row {i}, column '{col}'"))?,
                None => Value::Null,
            };
            cells[col_idx].push(value);
        }
    }

    Ok(frame_from_cells(columns, cells))
}

fn json_to_value(val: &JsonValue) -> Result<Value> {
    match val {
        JsonValue::String(s) => Ok(Value::Str(s.clone())),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Ok(Value::Str(n.to_string()))
            }
        }
        JsonValue::Bool(b) => Ok(Value::Str(b.to_string())),
        JsonValue::Null => Ok(Value::Null),
        other => bail!("expected a scalar, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), including the sample writer in
/// this crate.
fn load_parquet(path: &Path) -> Result<Frame> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<Value>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if columns.is_empty() {
            columns = schema.fields().iter().map(|f| f.name().clone()).collect();
            cells = vec![Vec::new(); columns.len()];
        }

        for (col_idx, col) in batch.columns().iter().enumerate() {
            let name = &columns[col_idx];
            for row in 0..batch.num_rows() {
                let value = extract_scalar(col, row)
                    .with_context(|| format!("column '{name}', row {row}"))?;
                cells[col_idx].push(value);
            }
        }
    }

    Ok(frame_from_cells(columns, cells))
}

/// Extract a single scalar value from an Arrow column at a given row.
fn extract_scalar(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(Value::Str(arr.value(row).to_string()))
        }
        DataType::LargeUtf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .context("expected LargeStringArray")?;
            Ok(Value::Str(arr.value(row).to_string()))
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(Value::Int(arr.value(row) as i64))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(Value::Int(arr.value(row)))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(Value::Float(arr.value(row) as f64))
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(Value::Float(arr.value(row)))
        }
        other => bail!("unsupported column type {other:?}, expected flat scalars"),
    }
}

// ---------------------------------------------------------------------------
// Type inference: cells → typed series
// ---------------------------------------------------------------------------

fn frame_from_cells(columns: Vec<String>, cells: Vec<Vec<Value>>) -> Frame {
    let series: Vec<(String, Series)> = columns
        .into_iter()
        .zip(cells)
        .map(|(name, col)| (name, infer_series(col)))
        .collect();
    Frame::new(series)
}

/// Unify a column of loosely-typed cells into one typed [`Series`]:
/// all-integer columns become `Int64`, integer/float mixes become
/// `Float64`, and everything else falls back to `Category` text (with
/// nulls as empty strings, surfaced later by schema coercion).
fn infer_series(cells: Vec<Value>) -> Series {
    let has_null = cells.iter().any(Value::is_null);
    let has_str = cells.iter().any(|v| matches!(v, Value::Str(_)));
    let has_float = cells.iter().any(|v| matches!(v, Value::Float(_)));
    let has_int = cells.iter().any(|v| matches!(v, Value::Int(_)));

    if !has_null && !has_str && has_int && !has_float {
        return Series::Int64(
            cells
                .iter()
                .map(|v| match v {
                    Value::Int(i) => *i,
                    _ => unreachable!(),
                })
                .collect(),
        );
    }
    if !has_null && !has_str && has_float {
        return Series::Float64(
            cells
                .iter()
                .map(|v| match v {
                    Value::Int(i) => *i as f64,
                    Value::Float(f) => *f,
                    _ => unreachable!(),
                })
                .collect(),
        );
    }
    Series::Category(
        cells
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dtype;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("carstats-loader-{}-{name}", std::process::id()))
    }

    #[test]
    fn guess_value_orders_int_before_float() {
        assert_eq!(guess_value("42"), Value::Int(42));
        assert_eq!(guess_value("42.5"), Value::Float(42.5));
        assert_eq!(guess_value(" Honda "), Value::Str("Honda".to_string()));
        assert_eq!(guess_value(""), Value::Null);
        assert_eq!(guess_value("  "), Value::Null);
    }

    #[test]
    fn infer_series_unifies_types() {
        assert_eq!(
            infer_series(vec![Value::Int(1), Value::Int(2)]),
            Series::Int64(vec![1, 2])
        );
        assert_eq!(
            infer_series(vec![Value::Int(1), Value::Float(2.5)]),
            Series::Float64(vec![1.0, 2.5])
        );
        assert_eq!(
            infer_series(vec![Value::Str("a".to_string()), Value::Int(1)]),
            Series::Category(vec!["a".to_string(), "1".to_string()])
        );
        // a null demotes a numeric column to text so coercion can report it
        assert_eq!(
            infer_series(vec![Value::Int(1), Value::Null]),
            Series::Category(vec!["1".to_string(), String::new()])
        );
    }

    #[test]
    fn csv_roundtrip_with_inference() {
        let path = temp_path("listings.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Make,Year,Mileage,Price").unwrap();
        writeln!(file, "Honda,2012,42000,9000").unwrap();
        writeln!(file, "Ford,2009,81000,4500").unwrap();
        drop(file);

        let frame = load_file(&path).unwrap();
        assert_eq!(frame.shape(), (2, 4));
        assert_eq!(frame.get("Make").unwrap().dtype(), Dtype::Category);
        assert_eq!(frame.get("Year").unwrap().dtype(), Dtype::Int64);
        assert_eq!(frame.get("Price").unwrap().as_f64(), Some(vec![9000.0, 4500.0]));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn json_records_load_with_union_of_keys() {
        let path = temp_path("listings.json");
        std::fs::write(
            &path,
            r#"[{"Make":"Honda","Price":9000},{"Make":"Ford","Price":4500,"Doors":4}]"#,
        )
        .unwrap();

        let frame = load_file(&path).unwrap();
        assert_eq!(frame.shape(), (2, 3));
        // Doors is missing in the first record, so the column degrades to text
        assert_eq!(
            frame.get("Doors"),
            Some(&Series::Category(vec![String::new(), "4".to_string()]))
        );
        assert_eq!(frame.get("Price").unwrap().dtype(), Dtype::Int64);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn parquet_flat_columns_load() {
        use arrow::array::{Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let path = temp_path("listings.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("Make", DataType::Utf8, false),
            Field::new("Price", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Honda", "Ford"])),
                Arc::new(Int64Array::from(vec![9000, 4500])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let frame = load_file(&path).unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(
            frame.get("Make"),
            Some(&Series::Category(vec![
                "Honda".to_string(),
                "Ford".to_string(),
            ]))
        );
        assert_eq!(frame.get("Price"), Some(&Series::Int64(vec![9000, 4500])));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("listings.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
