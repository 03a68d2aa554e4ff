//! Upload parsing
//!
//! Turns an [`UploadedFile`] into a [`Table`], dispatching on the file
//! extension. CSV cells are typed per column the way common dataframe
//! readers do it: integers, then floats, then booleans, then text, with a
//! fixed set of tokens treated as missing.

mod delimited;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::error::{CleanError, CleanResult};
use crate::excel::ExcelImporter;
use crate::types::{ColumnValue, SourceFormat, Table, UploadedFile};

/// Cell contents read as missing values
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// Parse an uploaded file into a table
pub fn parse_upload(file: &UploadedFile) -> CleanResult<Table> {
    let format = file.source_format()?;
    debug!(file = %file.name, ?format, bytes = file.content.len(), "parsing upload");

    let table_name = file.basename().to_string();
    let table = match format {
        SourceFormat::Csv => delimited::read_csv(&table_name, &file.content)?,
        SourceFormat::Xlsx => ExcelImporter::new(&table_name, &file.content).import()?,
    };

    table.validate_lengths().map_err(CleanError::Parse)?;
    debug!(
        file = %file.name,
        columns = table.columns.len(),
        rows = table.row_count(),
        "parsed upload"
    );
    Ok(table)
}

/// Read and parse a file from disk
pub fn parse_path<P: AsRef<Path>>(path: P) -> CleanResult<Table> {
    parse_upload(&UploadedFile::from_path(path)?)
}

/// Fill blank header cells and disambiguate repeated names (`a`, `a.1`, `a.2`)
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        if used.contains(&candidate) {
            let n = suffixes.entry(base.clone()).or_insert(0);
            loop {
                *n += 1;
                candidate = format!("{}.{}", base, n);
                if !used.contains(&candidate) {
                    break;
                }
            }
        }

        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

pub(crate) fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Pick the narrowest column type that holds every present cell
pub(crate) fn infer_column(cells: Vec<Option<String>>) -> ColumnValue {
    let present: Vec<&str> = cells.iter().flatten().map(|s| s.trim()).collect();
    let complete = !cells.is_empty() && present.len() == cells.len();

    if complete {
        let ints: Option<Vec<i64>> = present.iter().map(|s| s.parse::<i64>().ok()).collect();
        if let Some(ints) = ints {
            return ColumnValue::Integer(ints.into_iter().map(Some).collect());
        }
    }

    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnValue::Float(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(|s| s.trim().parse::<f64>().ok()))
                .collect(),
        );
    }

    let is_bool = |s: &&str| TRUE_VALUES.contains(s) || FALSE_VALUES.contains(s);
    if present.iter().all(is_bool) {
        return ColumnValue::Boolean(
            cells
                .iter()
                .map(|c| c.as_deref().map(|s| TRUE_VALUES.contains(&s.trim())))
                .collect(),
        );
    }

    ColumnValue::Text(cells)
}
