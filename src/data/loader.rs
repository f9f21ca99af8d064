use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Column, ColumnKind, Dataset};
use super::normalize::normalize_headers;

/// File name looked up when no path is given.
pub const DEFAULT_DATA_FILE: &str = "university_student_data.csv";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing at the path; callers show this as a notice, not a failure.
    #[error("no data file found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not read {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat scalar columns
/// * `.json`    – `[{ "Year": 2020, "Term": "Fall", ... }, ...]`
/// * anything else – delimited text with a header row
///
/// Column headers are normalized in every case.
pub fn load_file(path: &Path) -> std::result::Result<Dataset, LoadError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(LoadError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "parquet" | "pq" => load_parquet(file),
        "json" => load_json(file),
        _ => read_csv(file),
    };

    parsed.map_err(|e| LoadError::Malformed {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse delimited text with a header row.
///
/// Every column's kind is inferred from all of its raw fields before any cell
/// is converted, so a single non-numeric entry turns the column into text.
/// Short rows are padded with nulls; rows longer than the header are an error.
pub fn read_csv<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let raw_headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let names = normalize_headers(raw_headers.iter().map(String::as_str));

    let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > names.len() {
            bail!(
                "CSV row {row_no}: expected at most {} fields, found {}",
                names.len(),
                record.len()
            );
        }
        raw_rows.push(record);
    }

    let columns: Vec<Column> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let raw = raw_rows.iter().map(move |r| r.get(idx).unwrap_or(""));
            let kind = ColumnKind::infer_from_raw(raw);
            Column { name, kind }
        })
        .collect();

    let rows = raw_rows
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, col)| col.kind.parse(record.get(idx).unwrap_or("")))
                .collect()
        })
        .collect();

    Ok(Dataset::from_rows(columns, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year": 2021, "Term": "Spring", "Retention Rate (%)": 88.5 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys; a key absent from a record is null.
fn load_json<R: Read>(mut source: R) -> Result<Dataset> {
    let mut text = String::new();
    source.read_to_string(&mut text).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut raw_headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !raw_headers.contains(key) {
                raw_headers.push(key.clone());
            }
        }
    }

    let cells: Vec<Vec<CellValue>> = raw_headers
        .iter()
        .map(|key| {
            records
                .iter()
                .map(|rec| rec.get(key).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(assemble_columns(&raw_headers, cells, records.len()))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are rendered as text.
fn load_parquet(file: File) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let raw_headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); raw_headers.len()];
    let mut n_rows = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() != raw_headers.len() {
            bail!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                raw_headers.len()
            );
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                let value = extract_cell(array.as_ref(), row)
                    .with_context(|| format!("Row {}: column '{}'", n_rows + row, raw_headers[col_idx]))?;
                column.push(value);
            }
        }
        n_rows += batch.num_rows();
    }

    Ok(assemble_columns(&raw_headers, cells, n_rows))
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Text(array_value_to_string(col, row).context("formatting arrow value")?),
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Turn column-major typed cells into a row-major [`Dataset`].
fn assemble_columns(raw_headers: &[String], cells: Vec<Vec<CellValue>>, n_rows: usize) -> Dataset {
    let names = normalize_headers(raw_headers.iter().map(String::as_str));
    let mut columns = Vec::with_capacity(names.len());
    let mut typed: Vec<Vec<CellValue>> = Vec::with_capacity(names.len());

    for (name, column_cells) in names.into_iter().zip(cells) {
        let kind = ColumnKind::infer_from_cells(&column_cells);
        typed.push(column_cells.into_iter().map(|c| kind.coerce(c)).collect());
        columns.push(Column { name, kind });
    }

    let rows = (0..n_rows)
        .map(|row| typed.iter().map(|col| col[row].clone()).collect())
        .collect();

    Dataset::from_rows(columns, rows)
}
