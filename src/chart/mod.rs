//! Chart data for numeric columns
//!
//! The chart is a bar chart over the row index built from the first two
//! numeric columns. Tables without numeric columns produce no chart.

mod svg;

use serde::Serialize;

use crate::types::Table;

pub use svg::{render_svg, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Number of numeric columns plotted
pub const MAX_SERIES: usize = 2;

/// One plotted column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Bars per row index for up to [`MAX_SERIES`] numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub row_count: usize,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    /// Smallest and largest plotted value, if any value is present
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .filter(|v| v.is_finite())
            .fold(None, |range, &v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }
}

/// The table restricted to its numeric columns
pub fn numeric_projection(table: &Table) -> Table {
    Table {
        name: table.name.clone(),
        columns: table.numeric_columns().into_iter().cloned().collect(),
    }
}

/// Chart data for the table, or `None` when it has no numeric columns
pub fn chart_data(table: &Table) -> Option<ChartData> {
    let projection = numeric_projection(table);
    if projection.columns.is_empty() {
        return None;
    }

    let series = projection
        .columns
        .iter()
        .take(MAX_SERIES)
        .filter_map(|c| {
            Some(ChartSeries {
                name: c.name.clone(),
                values: c.values.as_f64()?,
            })
        })
        .collect();

    Some(ChartData {
        row_count: projection.row_count(),
        series,
    })
}
