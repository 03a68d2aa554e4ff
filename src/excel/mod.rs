//! Excel import/export
//!
//! - Import: first worksheet of an .xlsx upload → Table (calamine)
//! - Export: Table → single-sheet .xlsx workbook (rust_xlsxwriter)

mod exporter;
mod importer;

pub use exporter::{ExcelExporter, SHEET_NAME};
pub use importer::ExcelImporter;
