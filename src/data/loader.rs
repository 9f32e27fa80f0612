use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, info};
use serde_json::Value as JsonValue;

use super::coerce::parse_date_text;
use super::model::{Dataset, Value};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fail with [`AnalysisError::InputMissing`] unless `path` exists.
///
/// The error carries the absolute path so the user can see where the file
/// was looked for.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    let resolved = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Err(AnalysisError::InputMissing { path: resolved }.into())
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first sheet, or `sheet`
/// * `.csv`  – header row, cell types guessed
/// * `.json` – `[{ "column": value, ... }, ...]`
pub fn load_file(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    ensure_exists(path)?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => return Err(AnalysisError::UnsupportedExtension(other.to_string()).into()),
    };

    info!(
        "loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

/// Sheet names of a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    Ok(workbook.sheet_names())
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// The first row of the used range is the header; every following row is
/// data. Blank header cells are named `Unnamed: <index>`.
fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    let names = workbook.sheet_names();
    info!("sheets in workbook: {names:?}");

    let sheet_name = match sheet {
        Some(wanted) => {
            if !names.iter().any(|n| n == wanted) {
                return Err(AnalysisError::SheetNotFound {
                    sheet: wanted.to_string(),
                    available: names,
                }
                .into());
            }
            wanted.to_string()
        }
        None => names.first().cloned().ok_or_else(|| AnalysisError::NoSheets {
            path: PathBuf::from(path),
        })?,
    };
    debug!("reading sheet '{sheet_name}'");

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet '{sheet_name}'"))?;

    // The range begins at the first used column; leading blank columns still
    // count towards `Unnamed: <index>`.
    let offset = range.start().map_or(0, |(_, col)| col as usize);

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => (0..offset)
            .map(|i| header_label(&Data::Empty, i))
            .chain(
                header
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| header_label(cell, i + offset)),
            )
            .collect(),
        None => return Ok(Dataset::default()),
    };

    let data = rows
        .map(|row| {
            std::iter::repeat(Value::Missing)
                .take(offset)
                .chain(row.iter().map(cell_to_value))
                .collect()
        })
        .collect();

    Ok(Dataset::new(columns, data))
}

fn header_label(cell: &Data, index: usize) -> String {
    let label = match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string(),
    };
    if label.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        label
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Float(*f),
        Data::String(s) if s.trim().is_empty() => Value::Missing,
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt.as_datetime().map(Value::Date).unwrap_or(Value::Missing),
        Data::DateTimeIso(s) => parse_date_text(s)
            .map(Value::Date)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) | Data::Empty => Value::Missing,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Dato": "2024-01-05", "Kategori": "Mat", "Beløp": 120.5 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys absent from a record are
/// Missing in that row.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_value).unwrap_or(Value::Missing))
                .collect()
        })
        .collect();

    Ok(Dataset::new(columns, rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) if s.is_empty() => Value::Missing,
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Missing,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(
                "CSV row {row_no}: {} fields but only {} columns",
                record.len(),
                columns.len()
            );
        }
        rows.push(record.iter().map(guess_value).collect());
    }

    Ok(Dataset::new(columns, rows))
}

fn guess_value(s: &str) -> Value {
    if s.trim().is_empty() {
        return Value::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::Text(s.to_string())
}
