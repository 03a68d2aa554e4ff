//! Per-file cleaning pipeline
//!
//! Parse → Preview → [Fill Missing] → [Drop Columns] → [Chart] → [Serialize].
//! Each step after parsing only runs when requested. Files in a batch are
//! processed independently; one failure never stops the others.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cleaner::{self, FillSummary, DEFAULT_PREVIEW_ROWS};
use crate::chart::{self, ChartData};
use crate::error::CleanResult;
use crate::parser;
use crate::types::{Download, OutputFormat, Table, UploadedFile};
use crate::writer;

/// Which steps to run on each file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    pub fill_missing: bool,
    pub drop_columns: Vec<String>,
    pub chart: bool,
    pub format: Option<OutputFormat>,
    pub preview_rows: usize,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            fill_missing: false,
            drop_columns: Vec::new(),
            chart: false,
            format: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

/// Everything produced for one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_name: String,
    /// First rows as parsed
    pub preview: Table,
    pub fill: Option<FillSummary>,
    /// First rows after mean imputation
    pub filled_preview: Option<Table>,
    pub dropped: Vec<String>,
    /// First rows after dropping columns
    pub dropped_preview: Option<Table>,
    /// Chart requested but the table has no numeric columns
    pub chart_skipped: bool,
    pub chart: Option<ChartData>,
    pub download: Option<Download>,
    /// The cleaned table
    pub table: Table,
}

/// Result for one file of a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: CleanResult<FileReport>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the configured cleaning steps over uploaded files
pub struct Pipeline {
    options: CleanOptions,
}

impl Pipeline {
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Process a single file; any failure is fatal for this file only
    pub fn process(&self, file: &UploadedFile) -> CleanResult<FileReport> {
        let rows = self.options.preview_rows;
        let mut table = parser::parse_upload(file)?;
        let preview = cleaner::preview(&table, rows);

        let (fill, filled_preview) = if self.options.fill_missing {
            let summary = cleaner::fill_missing(&mut table);
            info!(
                file = %file.name,
                columns = summary.columns.len(),
                cells = summary.total_filled(),
                "missing values filled with column mean"
            );
            (Some(summary), Some(cleaner::preview(&table, rows)))
        } else {
            (None, None)
        };

        let (dropped, dropped_preview) = if self.options.drop_columns.is_empty() {
            (Vec::new(), None)
        } else {
            let dropped = cleaner::drop_columns(&mut table, &self.options.drop_columns)?;
            info!(file = %file.name, dropped = %dropped.join(", "), "dropped columns");
            (dropped, Some(cleaner::preview(&table, rows)))
        };

        let (chart, chart_skipped) = if self.options.chart {
            match chart::chart_data(&table) {
                Some(data) => (Some(data), false),
                None => {
                    info!(file = %file.name, "no numeric columns, chart skipped");
                    (None, true)
                }
            }
        } else {
            (None, false)
        };

        let download = match self.options.format {
            Some(format) => Some(writer::serialize(&table, format, file)?),
            None => None,
        };

        Ok(FileReport {
            file_name: file.name.clone(),
            preview,
            fill,
            filled_preview,
            dropped,
            dropped_preview,
            chart_skipped,
            chart,
            download,
            table,
        })
    }

    /// Process every file in upload order, collecting per-file results
    pub fn process_batch(&self, files: &[UploadedFile]) -> Vec<FileOutcome> {
        files
            .iter()
            .map(|file| {
                let result = self.process(file);
                if let Err(e) = &result {
                    warn!(file = %file.name, error = %e, "file processing failed");
                }
                FileOutcome {
                    file_name: file.name.clone(),
                    result,
                }
            })
            .collect()
    }
}

/// Process one file with the given options
pub fn process_file(file: &UploadedFile, options: &CleanOptions) -> CleanResult<FileReport> {
    Pipeline::new(options.clone()).process(file)
}

/// Process files independently with shared options
pub fn process_batch(files: &[UploadedFile], options: &CleanOptions) -> Vec<FileOutcome> {
    Pipeline::new(options.clone()).process_batch(files)
}
