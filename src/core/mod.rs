//! Cleaning operations and the per-file pipeline

pub mod cleaner;
pub mod pipeline;

pub use cleaner::{
    column_mean, drop_columns, fill_missing, preview, FillSummary, FilledColumn,
    DEFAULT_PREVIEW_ROWS,
};
pub use pipeline::{process_batch, process_file, CleanOptions, FileOutcome, FileReport, Pipeline};
