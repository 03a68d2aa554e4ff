//! Excel importer implementation - Excel (.xlsx) → Table

use crate::error::{CleanError, CleanResult};
use crate::parser::normalize_headers;
use crate::types::{format_float, Column, ColumnValue, Table};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::Cursor;

/// Excel importer reading the first worksheet of an in-memory .xlsx file
pub struct ExcelImporter<'a> {
    table_name: String,
    content: &'a [u8],
}

impl<'a> ExcelImporter<'a> {
    /// Create a new Excel importer over uploaded bytes
    pub fn new(table_name: &str, content: &'a [u8]) -> Self {
        Self {
            table_name: table_name.to_string(),
            content,
        }
    }

    /// Import the first worksheet as a table
    pub fn import(&self) -> CleanResult<Table> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(self.content))?;

        let sheet_names = workbook.sheet_names();
        let first = sheet_names
            .first()
            .ok_or_else(|| CleanError::Excel("Workbook has no worksheets".to_string()))?;

        let range = workbook.worksheet_range(first)?;
        self.process_sheet(&range)
    }

    /// Convert a worksheet range (header row + data rows) to a table
    fn process_sheet(&self, range: &Range<Data>) -> CleanResult<Table> {
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) if !range.is_empty() => header,
            _ => {
                return Err(CleanError::Parse(
                    "No columns to parse from file".to_string(),
                ))
            }
        };

        let width = header.len();
        let column_names = normalize_headers(header.iter().map(Self::header_name).collect());

        // Collect all data (skip header row)
        let mut columns_data: Vec<Vec<Data>> = vec![Vec::new(); width];
        for row in rows {
            for (col, column_data) in columns_data.iter_mut().enumerate() {
                column_data.push(row.get(col).cloned().unwrap_or(Data::Empty));
            }
        }

        let mut table = Table::new(self.table_name.clone());
        for (name, data) in column_names.into_iter().zip(columns_data) {
            table.add_column(Column::new(name, self.convert_to_column_value(&data)));
        }
        Ok(table)
    }

    fn header_name(cell: &Data) -> String {
        match cell {
            Data::String(s) => s.clone(),
            Data::Empty | Data::Error(_) => String::new(),
            Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
            other => Self::cell_text(other),
        }
    }

    fn is_missing(cell: &Data) -> bool {
        match cell {
            Data::Empty | Data::Error(_) => true,
            Data::String(s) => s.is_empty(),
            _ => false,
        }
    }

    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Float(f) => format_float(*f),
            Data::Int(i) => i.to_string(),
            Data::Bool(true) => "True".to_string(),
            Data::Bool(false) => "False".to_string(),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => {
                    let text = datetime.to_string();
                    match text.strip_suffix(" 00:00:00") {
                        Some(date) => date.to_string(),
                        None => text,
                    }
                }
                None => cell.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Convert Excel Data array to ColumnValue
    fn convert_to_column_value(&self, data: &[Data]) -> ColumnValue {
        let present: Vec<&Data> = data.iter().filter(|c| !Self::is_missing(c)).collect();

        if present
            .iter()
            .all(|c| matches!(c, Data::Int(_) | Data::Float(_)))
        {
            let integral = !present.is_empty()
                && present.len() == data.len()
                && present.iter().all(|c| match c {
                    Data::Int(_) => true,
                    Data::Float(f) => f.fract() == 0.0 && f.abs() < 9.0e15,
                    _ => false,
                });

            if integral {
                let ints = data
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(i) => Some(*i),
                        Data::Float(f) => Some(*f as i64),
                        _ => None,
                    })
                    .collect();
                return ColumnValue::Integer(ints);
            }

            let numbers = data
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            return ColumnValue::Float(numbers);
        }

        if present.iter().all(|c| matches!(c, Data::Bool(_))) {
            let bools = data
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            return ColumnValue::Boolean(bools);
        }

        let texts = data
            .iter()
            .map(|cell| (!Self::is_missing(cell)).then(|| Self::cell_text(cell)))
            .collect();
        ColumnValue::Text(texts)
    }
}
