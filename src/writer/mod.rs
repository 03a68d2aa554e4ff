//! Output serialization: Table → downloadable bytes

use csv::{Terminator, WriterBuilder};
use tracing::debug;

use crate::error::{CleanError, CleanResult};
use crate::excel::ExcelExporter;
use crate::types::{Download, OutputFormat, Table, UploadedFile, Value};

/// Download name for a cleaned upload: `<name up to first dot>_cleaned.<ext>`
pub fn output_file_name(upload_name: &str, format: OutputFormat) -> String {
    let basename = upload_name.split('.').next().unwrap_or(upload_name);
    format!("{}_cleaned.{}", basename, format.extension())
}

/// Serialize a table in the chosen format, named after the upload it came from
pub fn serialize(table: &Table, format: OutputFormat, source: &UploadedFile) -> CleanResult<Download> {
    let bytes = match format {
        OutputFormat::Csv => write_csv(table)?,
        OutputFormat::Excel => ExcelExporter::new(table).to_bytes()?,
    };
    debug!(
        file = %source.name,
        format = format.label(),
        bytes = bytes.len(),
        "serialized table"
    );

    Ok(Download {
        file_name: output_file_name(&source.name, format),
        media_type: format.media_type(),
        bytes,
    })
}

/// CSV with a header row, no index column, `\n` line endings
pub fn write_csv(table: &Table) -> CleanResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;
    for row in table.rows() {
        writer.write_record(row.iter().map(csv_field))?;
    }

    writer
        .into_inner()
        .map_err(|e| CleanError::Export(format!("Failed to flush CSV output: {}", e)))
}

/// NaN has no CSV spelling; it is written as a missing cell
fn csv_field(value: &Value) -> String {
    match value {
        Value::Float(f) if f.is_nan() => String::new(),
        other => other.to_string(),
    }
}
