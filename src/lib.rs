//! tabclean - CSV & Excel file cleaner
//!
//! This library parses uploaded CSV / xlsx files into typed tables, fills
//! missing numeric values with the column mean, drops columns, derives chart
//! data from numeric columns and serializes the result back to CSV or Excel.
//!
//! # Features
//!
//! - Type inference per column (Integer, Float, Boolean, Text)
//! - Mean imputation for numeric columns
//! - Column dropping with unknown-name detection
//! - Bar chart data for the first two numeric columns (SVG rendering)
//! - `<basename>_cleaned.csv` / `.xlsx` downloads
//!
//! # Example
//!
//! ```no_run
//! use tabclean::core::{process_file, CleanOptions};
//! use tabclean::types::{OutputFormat, UploadedFile};
//!
//! let file = UploadedFile::from_path("sales.csv")?;
//! let options = CleanOptions {
//!     fill_missing: true,
//!     format: Some(OutputFormat::Excel),
//!     ..Default::default()
//! };
//!
//! let report = process_file(&file, &options)?;
//! if let Some(download) = report.download {
//!     std::fs::write(&download.file_name, &download.bytes)?;
//! }
//! # Ok::<(), tabclean::error::CleanError>(())
//! ```

pub mod api;
pub mod chart;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{CleanError, CleanResult};
pub use types::{Column, ColumnValue, OutputFormat, Table, UploadedFile, Value};
