//! Excel exporter implementation - Table → Excel (.xlsx)

use crate::error::{CleanError, CleanResult};
use crate::types::{ColumnValue, Table};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Worksheet name used for exported tables
pub const SHEET_NAME: &str = "Sheet1";

/// Excel row limit (header included)
const MAX_ROWS: usize = 1_048_576;
/// Excel column limit
const MAX_COLUMNS: usize = 16_384;

/// Excel exporter writing one table to a single-sheet workbook
pub struct ExcelExporter<'a> {
    table: &'a Table,
    sheet_name: String,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            sheet_name: SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Serialize the workbook to bytes
    pub fn to_bytes(&self) -> CleanResult<Vec<u8>> {
        let mut workbook = self.build_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Export the table to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> CleanResult<()> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save(output_path)
            .map_err(|e| CleanError::Export(format!("Failed to save Excel file: {}", e)))?;
        Ok(())
    }

    fn build_workbook(&self) -> CleanResult<Workbook> {
        let row_count = self.table.row_count();
        if row_count + 1 > MAX_ROWS {
            return Err(CleanError::Export(format!(
                "Table has {} rows, Excel allows at most {}",
                row_count,
                MAX_ROWS - 1
            )));
        }
        if self.table.columns.len() > MAX_COLUMNS {
            return Err(CleanError::Export(format!(
                "Table has {} columns, Excel allows at most {}",
                self.table.columns.len(),
                MAX_COLUMNS
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| CleanError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

        // Header row (row 0), then data rows starting at row 1
        for (col_idx, column) in self.table.columns.iter().enumerate() {
            let col = col_idx as u16;
            worksheet
                .write_string_with_format(0, col, &column.name, &header_format)
                .map_err(|e| CleanError::Export(format!("Failed to write header: {}", e)))?;

            for row_idx in 0..row_count {
                Self::write_cell_value(worksheet, (row_idx + 1) as u32, col, &column.values, row_idx)?;
            }
        }

        Ok(workbook)
    }

    /// Write one cell; missing values and NaN stay blank
    fn write_cell_value(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        values: &ColumnValue,
        index: usize,
    ) -> CleanResult<()> {
        let result = match values {
            ColumnValue::Integer(v) => match v.get(index).copied().flatten() {
                Some(i) => worksheet.write_number(row, col, i as f64).map(|_| ()),
                None => Ok(()),
            },
            ColumnValue::Float(v) => match v.get(index).copied().flatten() {
                Some(f) if f.is_nan() => Ok(()),
                Some(f) if f.is_infinite() => {
                    let text = if f > 0.0 { "inf" } else { "-inf" };
                    worksheet.write_string(row, col, text).map(|_| ())
                }
                Some(f) => worksheet.write_number(row, col, f).map(|_| ()),
                None => Ok(()),
            },
            ColumnValue::Boolean(v) => match v.get(index).copied().flatten() {
                Some(b) => worksheet.write_boolean(row, col, b).map(|_| ()),
                None => Ok(()),
            },
            ColumnValue::Text(v) => match v.get(index).and_then(|c| c.as_deref()) {
                Some(s) => worksheet.write_string(row, col, s).map(|_| ()),
                None => Ok(()),
            },
        };

        result.map_err(|e| CleanError::Export(format!("Failed to write cell: {}", e)))
    }
}
