// Dataset loading from uploaded CSV or JSON text

use crate::error::{ChartError, Result};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Declared format of an uploaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    /// Map a declared mimetype onto a parse path.
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mimetype(mimetype: &str) -> Result<Self> {
        let essence = mimetype.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/csv" => Ok(DataFormat::Csv),
            "application/json" => Ok(DataFormat::Json),
            _ => Err(ChartError::UnsupportedFormat(mimetype.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Csv => f.write_str("CSV"),
            DataFormat::Json => f.write_str("JSON"),
        }
    }
}

/// A single cell. CSV cells are always `Text`; JSON keeps scalar types.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Display form used for category labels
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Number(n) => Cow::Owned(n.to_string()),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Null => Cow::Borrowed(""),
        }
    }
}

/// One row: column name -> cell, in column order
pub type Record = IndexMap<String, CellValue>;

/// Parsed records plus the column list taken from the first record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    columns: Vec<String>,
}

impl Dataset {
    /// Build a dataset, rejecting records whose column set differs from the first record's
    fn from_records(format: DataFormat, records: Vec<Record>) -> Result<Self> {
        let columns: Vec<String> = records
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();

        for (idx, record) in records.iter().enumerate().skip(1) {
            let uniform = record.len() == columns.len()
                && columns.iter().all(|c| record.contains_key(c));
            if !uniform {
                return Err(ChartError::Parse {
                    format,
                    message: format!(
                        "record {} has columns [{}], expected [{}]",
                        idx,
                        record.keys().cloned().collect::<Vec<_>>().join(", "),
                        columns.join(", ")
                    ),
                });
            }
        }

        Ok(Self { records, columns })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fail with `UnknownColumn` unless `column` exists in this dataset
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ChartError::unknown_column(column, &self.columns))
        }
    }

    /// Cells of one column in record order
    pub fn column_cells<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.records
            .iter()
            .map(move |r| r.get(column).unwrap_or(&CellValue::Null))
    }
}

/// Parse raw content into a dataset according to its declared format
pub fn load(content: &str, format: DataFormat) -> Result<Dataset> {
    let records = match format {
        DataFormat::Csv => parse_csv(content),
        DataFormat::Json => parse_json(content),
    }
    .map_err(|message| ChartError::Parse { format, message })?;

    Dataset::from_records(format, records)
}

/// Resolve the declared mimetype, then parse
pub fn load_declared(content: &str, mimetype: &str) -> Result<Dataset> {
    load(content, DataFormat::from_mimetype(mimetype)?)
}

fn parse_csv(content: &str) -> std::result::Result<Vec<Record>, String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| e.to_string())?;
        let record: Record = headers
            .iter()
            .cloned()
            .zip(row.iter().map(|cell| CellValue::Text(cell.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}

fn parse_json(content: &str) -> std::result::Result<Vec<Record>, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let array = value
        .as_array()
        .ok_or_else(|| "input data must be a JSON array of objects".to_string())?;

    let mut records = Vec::with_capacity(array.len());
    for (idx, item) in array.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| format!("item {} in array is not an object", idx))?;

        let mut record = Record::with_capacity(obj.len());
        for (key, val) in obj {
            let cell = match val {
                Value::String(s) => CellValue::Text(s.clone()),
                Value::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
                Value::Bool(b) => CellValue::Bool(*b),
                Value::Null => CellValue::Null,
                Value::Array(_) | Value::Object(_) => {
                    return Err(format!(
                        "unsupported nested value for field '{}' in item {}",
                        key, idx
                    ))
                }
            };
            record.insert(key.clone(), cell);
        }
        records.push(record);
    }

    Ok(records)
}
