use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{CleanError, CleanResult};

//==============================================================================
// Uploads and formats
//==============================================================================

/// A file handed to the pipeline: its name (with extension) and raw bytes
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> CleanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, content })
    }

    /// Extension after the last dot, if any
    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() && !self.name[1..].contains('.') {
            // ".csv" alone is a hidden file name, not an extension
            return None;
        }
        Some(ext)
    }

    /// Name up to the first dot, used for download names
    pub fn basename(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn source_format(&self) -> CleanResult<SourceFormat> {
        SourceFormat::from_file_name(self)
    }
}

/// Input formats recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    pub fn from_file_name(file: &UploadedFile) -> CleanResult<Self> {
        match file.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("xlsx") => Ok(SourceFormat::Xlsx),
            _ => Err(CleanError::UnsupportedFormat {
                file_name: file.name.clone(),
            }),
        }
    }
}

/// Download formats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    #[value(alias = "xlsx")]
    #[serde(alias = "xlsx")]
    Excel,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Excel => "xlsx",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "CSV",
            OutputFormat::Excel => "Excel",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            other => Err(CleanError::Validation(format!(
                "Unknown output format '{}' (expected csv or excel)",
                other
            ))),
        }
    }
}

/// Serialized output ready to hand to a user
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

//==============================================================================
// Table model
//==============================================================================

/// Column value types (homogeneous arrays, `None` marks a missing cell)
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnValue {
    /// Get the length of the array
    pub fn len(&self) -> usize {
        match self {
            ColumnValue::Integer(v) => v.len(),
            ColumnValue::Float(v) => v.len(),
            ColumnValue::Boolean(v) => v.len(),
            ColumnValue::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Integer(_) => "Integer",
            ColumnValue::Float(_) => "Float",
            ColumnValue::Boolean(_) => "Boolean",
            ColumnValue::Text(_) => "Text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValue::Integer(_) | ColumnValue::Float(_))
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnValue::Integer(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValue::Float(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValue::Boolean(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValue::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Numeric view of the column; `None` for non-numeric types
    pub fn as_f64(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnValue::Integer(v) => Some(v.iter().map(|c| c.map(|i| i as f64)).collect()),
            ColumnValue::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn get(&self, row: usize) -> Value {
        match self {
            ColumnValue::Integer(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Missing, Value::Integer),
            ColumnValue::Float(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Missing, Value::Float),
            ColumnValue::Boolean(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Missing, Value::Boolean),
            ColumnValue::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map_or(Value::Missing, Value::Text),
        }
    }

    /// First `n` cells
    pub fn head(&self, n: usize) -> Self {
        fn take<T: Clone>(v: &[T], n: usize) -> Vec<T> {
            v.iter().take(n).cloned().collect()
        }
        match self {
            ColumnValue::Integer(v) => ColumnValue::Integer(take(v, n)),
            ColumnValue::Float(v) => ColumnValue::Float(take(v, n)),
            ColumnValue::Boolean(v) => ColumnValue::Boolean(take(v, n)),
            ColumnValue::Text(v) => ColumnValue::Text(take(v, n)),
        }
    }
}

/// A single cell, detached from its column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip form that always keeps a fractional part (1 → "1.0")
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = x.to_string();
    if s.contains('.') || s.contains('e') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// A named column of typed values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValue,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValue) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of equal-length columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn with_column(mut self, name: &str, values: ColumnValue) -> Self {
        self.add_column(Column::new(name, values));
        self
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |col| col.len())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns holding Integer or Float values, in table order
    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.values.is_numeric())
            .collect()
    }

    pub fn row(&self, index: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.values.get(index)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count()).map(move |i| self.row(i))
    }

    /// Copy of the first `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values.head(n)))
                .collect(),
        }
    }

    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.missing_count()).sum()
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> Result<(), String> {
        let row_count = self.row_count();
        for column in &self.columns {
            if column.len() != row_count {
                return Err(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name,
                    column.len(),
                    row_count
                ));
            }
        }
        Ok(())
    }
}
