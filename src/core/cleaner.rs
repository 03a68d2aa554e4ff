//! Cleaning operations on a parsed table
//!
//! Both operations mutate the table in place and report what they changed.

use serde::Serialize;
use tracing::debug;

use crate::error::{CleanError, CleanResult};
use crate::types::{ColumnValue, Table};

/// Number of rows shown by default in a preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// One column touched by mean imputation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledColumn {
    pub name: String,
    pub filled: usize,
    pub mean: f64,
}

/// What `fill_missing` changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillSummary {
    pub columns: Vec<FilledColumn>,
}

impl FillSummary {
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// First `rows` rows of the table; the table itself is untouched
pub fn preview(table: &Table, rows: usize) -> Table {
    table.head(rows)
}

fn is_missing(cell: Option<f64>) -> bool {
    cell.map_or(true, f64::is_nan)
}

/// Arithmetic mean over the present values of a numeric column
///
/// Returns `None` for non-numeric columns, for columns with no values and
/// when the mean is undefined (`inf` and `-inf` in the same column).
pub fn column_mean(values: &ColumnValue) -> Option<f64> {
    let numbers = values.as_f64()?;
    let present: Vec<f64> = numbers.into_iter().filter_map(|c| c.filter(|f| !f.is_nan())).collect();
    if present.is_empty() {
        return None;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    (!mean.is_nan()).then_some(mean)
}

/// Replace missing cells in every numeric column with that column's mean
///
/// Filled columns become `Float`. Non-numeric columns and numeric columns
/// with no values at all are left as they are, so a second call is a no-op.
pub fn fill_missing(table: &mut Table) -> FillSummary {
    let mut summary = FillSummary::default();

    for column in &mut table.columns {
        let Some(numbers) = column.values.as_f64() else {
            continue;
        };
        let filled = numbers.iter().filter(|c| is_missing(**c)).count();
        if filled == 0 {
            continue;
        }
        let Some(mean) = column_mean(&column.values) else {
            continue;
        };

        column.values = ColumnValue::Float(
            numbers
                .into_iter()
                .map(|c| if is_missing(c) { Some(mean) } else { c })
                .collect(),
        );

        debug!(column = %column.name, filled, mean, "filled missing values");
        summary.columns.push(FilledColumn {
            name: column.name.clone(),
            filled,
            mean,
        });
    }

    summary
}

/// Remove the selected columns, keeping the order of the rest
///
/// Every selected name must exist; otherwise nothing is removed and the
/// unknown names are reported. Returns the names actually dropped.
pub fn drop_columns(table: &mut Table, selection: &[String]) -> CleanResult<Vec<String>> {
    let mut unknown: Vec<String> = Vec::new();
    for name in selection {
        if !table.has_column(name) && !unknown.contains(name) {
            unknown.push(name.clone());
        }
    }
    if !unknown.is_empty() {
        return Err(CleanError::UnknownColumns(unknown));
    }

    let mut dropped = Vec::new();
    table.columns.retain(|c| {
        let remove = selection.contains(&c.name);
        if remove {
            dropped.push(c.name.clone());
        }
        !remove
    });

    debug!(table = %table.name, dropped = ?dropped, "dropped columns");
    Ok(dropped)
}
