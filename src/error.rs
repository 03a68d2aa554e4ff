use thiserror::Error;

pub type CleanResult<T> = Result<T, CleanError>;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: '{file_name}' (expected .csv or .xlsx)")]
    UnsupportedFormat { file_name: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown column(s): {}", .0.join(", "))]
    UnknownColumns(Vec<String>),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<csv::Error> for CleanError {
    fn from(e: csv::Error) -> Self {
        CleanError::Csv(e.to_string())
    }
}

impl From<calamine::XlsxError> for CleanError {
    fn from(e: calamine::XlsxError) -> Self {
        CleanError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for CleanError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        CleanError::Export(e.to_string())
    }
}

impl CleanError {
    /// Whether the failure came from reading the upload itself
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CleanError::UnsupportedFormat { .. }
                | CleanError::Csv(_)
                | CleanError::Excel(_)
                | CleanError::Parse(_)
        )
    }
}
