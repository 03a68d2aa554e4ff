//! CSV reader

use csv::ReaderBuilder;

use super::{infer_column, is_na, normalize_headers};
use crate::error::{CleanError, CleanResult};
use crate::types::{Column, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read comma-separated bytes with a header row into a typed table
pub(crate) fn read_csv(table_name: &str, content: &[u8]) -> CleanResult<Table> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(CleanError::Parse(
                "No columns to parse from file".to_string(),
            ))
        }
    };
    let names = normalize_headers(header.iter().map(str::to_string).collect());
    let width = names.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for record in records {
        // Blank lines never reach here; a lone `""` is a row with one missing cell
        let record = record?;
        if record.len() > width {
            let line = record.position().map_or(0, |p| p.line());
            return Err(CleanError::Parse(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }

        for (col, column_cells) in cells.iter_mut().enumerate() {
            let cell = record
                .get(col)
                .filter(|s| !is_na(s))
                .map(str::to_string);
            column_cells.push(cell);
        }
    }

    let mut table = Table::new(table_name);
    for (name, column_cells) in names.into_iter().zip(cells) {
        table.add_column(Column::new(name, infer_column(column_cells)));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_csv_types_and_missing() {
        let table = read_csv("t", b"a,b,name\n1,,x\n,4,\n").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "name"]);
        assert_eq!(
            table.column("a").unwrap().values,
            ColumnValue::Float(vec![Some(1.0), None])
        );
        assert_eq!(
            table.column("b").unwrap().values,
            ColumnValue::Float(vec![None, Some(4.0)])
        );
        assert_eq!(
            table.column("name").unwrap().values,
            ColumnValue::Text(vec![Some("x".into()), None])
        );
    }

    #[test]
    fn test_read_csv_strips_bom_and_quotes() {
        let table = read_csv("t", b"\xEF\xBB\xBFcity,note\n\"Paris\",\"a, b\"\n").unwrap();
        assert_eq!(table.column_names(), vec!["city", "note"]);
        assert_eq!(
            table.column("note").unwrap().values,
            ColumnValue::Text(vec![Some("a, b".into())])
        );
    }

    #[test]
    fn test_read_csv_pads_short_rows() {
        let table = read_csv("t", b"a,b,c\n1,2\n3,4,5\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column("c").unwrap().values,
            ColumnValue::Float(vec![None, Some(5.0)])
        );
    }

    #[test]
    fn test_read_csv_quoted_empty_line_is_a_missing_row() {
        let table = read_csv("t", b"a\n1\n\"\"\n3\n\n").unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.column("a").unwrap().values,
            ColumnValue::Float(vec![Some(1.0), None, Some(3.0)])
        );
    }

    #[test]
    fn test_read_csv_rejects_long_rows() {
        let err = read_csv("t", b"a,b\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("Expected 2 fields"));
    }

    #[test]
    fn test_read_csv_empty_input() {
        let err = read_csv("t", b"").unwrap_err();
        assert!(err.to_string().contains("No columns to parse"));
    }

    #[test]
    fn test_read_csv_header_only() {
        let table = read_csv("t", b"a,b\n").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_read_csv_invalid_utf8() {
        let err = read_csv("t", b"a\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, CleanError::Csv(_)));
    }
}
