//! API request handlers
//!
//! Handlers for all REST API endpoints. Upload endpoints take
//! `multipart/form-data`: every field carrying a file name is an upload, the
//! remaining fields are cleaning options.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::server::AppState;
use crate::chart::ChartData;
use crate::core::{CleanOptions, FileOutcome, FileReport, FillSummary, Pipeline};
use crate::error::CleanError;
use crate::types::{Download, OutputFormat, Table, UploadedFile, Value};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Request-level failure, rendered as an error envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<CleanError> for ApiError {
    fn from(e: CleanError) -> Self {
        let status = match e {
            CleanError::Io(_) | CleanError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, e.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(r: MultipartRejection) -> Self {
        Self::new(r.status(), r.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

//==============================================================================
// Info endpoints
//==============================================================================

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "tabclean API Server".to_string(),
        version: state.version.clone(),
        description: "Upload CSV / Excel files to preview, clean and convert them".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint(
                "/api/v1/preview",
                "POST",
                "Preview the first rows of uploaded files",
            ),
            endpoint(
                "/api/v1/process",
                "POST",
                "Fill missing values, drop columns and chart uploaded files",
            ),
            endpoint(
                "/api/v1/convert",
                "POST",
                "Clean one uploaded file and download it as CSV or Excel",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "preview".to_string(),
            "fill_missing".to_string(),
            "drop".to_string(),
            "chart".to_string(),
            "convert".to_string(),
        ],
    }))
}

//==============================================================================
// Upload forms
//==============================================================================

/// Files and options read from a multipart request
#[derive(Debug)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub options: CleanOptions,
}

async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    preview_rows: usize,
) -> Result<UploadForm, ApiError> {
    let mut multipart = multipart?;
    let mut form = UploadForm {
        files: Vec::new(),
        options: CleanOptions {
            preview_rows,
            ..Default::default()
        },
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            // Browsers send an empty part when no file was picked
            if file_name.is_empty() {
                continue;
            }
            let content = field.bytes().await?;
            debug!(field = %name, file = %file_name, bytes = content.len(), "received upload");
            form.files.push(UploadedFile::new(file_name, content.to_vec()));
            continue;
        }

        let value = field.text().await?;
        apply_option(&mut form.options, &name, &value)?;
    }

    Ok(form)
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "" | "false" | "0" | "off" | "no" => Ok(false),
        other => Err(ApiError::bad_request(format!(
            "Invalid value '{}' for '{}' (expected true or false)",
            other, name
        ))),
    }
}

/// Apply one non-file form field to the options
fn apply_option(options: &mut CleanOptions, name: &str, value: &str) -> Result<(), ApiError> {
    match name {
        "fill_missing" => options.fill_missing = parse_flag(name, value)?,
        "chart" => options.chart = parse_flag(name, value)?,
        "drop" => options.drop_columns.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        ),
        "format" => {
            options.format = if value.trim().is_empty() {
                None
            } else {
                Some(
                    value
                        .parse::<OutputFormat>()
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                )
            };
        }
        "preview_rows" => {
            options.preview_rows = value.trim().parse().map_err(|_| {
                ApiError::bad_request(format!("Invalid preview_rows '{}'", value))
            })?;
        }
        other => debug!(field = other, "ignoring unknown form field"),
    }
    Ok(())
}

fn require_files(form: &UploadForm) -> Result<(), ApiError> {
    if form.files.is_empty() {
        Err(ApiError::bad_request("No files uploaded"))
    } else {
        Ok(())
    }
}

//==============================================================================
// Response payloads
//==============================================================================

#[derive(Debug, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: &'static str,
    pub missing: usize,
}

/// Column metadata plus the rows of a (usually truncated) table
#[derive(Debug, Serialize)]
pub struct TablePreview {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Value>>,
}

impl From<&Table> for TablePreview {
    fn from(table: &Table) -> Self {
        Self {
            columns: table
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    dtype: c.values.type_name(),
                    missing: c.values.missing_count(),
                })
                .collect(),
            rows: table.rows().collect(),
        }
    }
}

/// Metadata of a produced download
#[derive(Debug, Serialize)]
pub struct DownloadInfo {
    pub file_name: String,
    pub media_type: &'static str,
    pub size: usize,
}

impl From<&Download> for DownloadInfo {
    fn from(download: &Download) -> Self {
        Self {
            file_name: download.file_name.clone(),
            media_type: download.media_type,
            size: download.bytes.len(),
        }
    }
}

/// Preview of one uploaded file
#[derive(Debug, Serialize)]
pub struct FilePreview {
    pub file_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<TablePreview>,
}

impl From<FileOutcome> for FilePreview {
    fn from(outcome: FileOutcome) -> Self {
        match outcome.result {
            Ok(report) => Self {
                file_name: outcome.file_name,
                success: true,
                error: None,
                total_rows: Some(report.table.row_count()),
                preview: Some(TablePreview::from(&report.preview)),
            },
            Err(e) => Self {
                file_name: outcome.file_name,
                success: false,
                error: Some(e.to_string()),
                total_rows: None,
                preview: None,
            },
        }
    }
}

/// Processing report for one uploaded file
#[derive(Debug, Default, Serialize)]
pub struct ProcessedFile {
    pub file_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<TablePreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_preview: Option<TablePreview>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_preview: Option<TablePreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartData>,
    pub chart_skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<DownloadInfo>,
}

impl From<FileReport> for ProcessedFile {
    fn from(report: FileReport) -> Self {
        Self {
            success: true,
            total_rows: Some(report.table.row_count()),
            preview: Some(TablePreview::from(&report.preview)),
            fill: report.fill,
            filled_preview: report.filled_preview.as_ref().map(TablePreview::from),
            dropped: report.dropped,
            dropped_preview: report.dropped_preview.as_ref().map(TablePreview::from),
            chart: report.chart,
            chart_skipped: report.chart_skipped,
            download: report.download.as_ref().map(DownloadInfo::from),
            file_name: report.file_name,
            error: None,
        }
    }
}

impl From<FileOutcome> for ProcessedFile {
    fn from(outcome: FileOutcome) -> Self {
        match outcome.result {
            Ok(report) => report.into(),
            Err(e) => Self {
                file_name: outcome.file_name,
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }
}

/// `Content-Disposition` value offering the download as an attachment
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

//==============================================================================
// Upload endpoints
//==============================================================================

/// POST /api/v1/preview - First rows of every uploaded file
pub async fn preview(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<Vec<FilePreview>>>, ApiError> {
    let form = read_form(multipart, state.preview_rows).await?;
    require_files(&form)?;

    // Only parse and preview, whatever options were sent
    let pipeline = Pipeline::new(CleanOptions {
        preview_rows: form.options.preview_rows,
        ..Default::default()
    });
    let previews: Vec<FilePreview> = pipeline
        .process_batch(&form.files)
        .into_iter()
        .map(FilePreview::from)
        .collect();

    Ok(Json(ApiResponse::ok(previews)))
}

/// POST /api/v1/process - Run the requested cleaning steps on every file
pub async fn process(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<Vec<ProcessedFile>>>, ApiError> {
    let form = read_form(multipart, state.preview_rows).await?;
    require_files(&form)?;

    let outcomes = Pipeline::new(form.options).process_batch(&form.files);
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(files = outcomes.len(), failed, "processed upload batch");

    let reports: Vec<ProcessedFile> = outcomes.into_iter().map(ProcessedFile::from).collect();
    Ok(Json(ApiResponse::ok(reports)))
}

/// POST /api/v1/convert - Clean one file and return it as a download
pub async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut form = read_form(multipart, state.preview_rows).await?;
    require_files(&form)?;
    if form.files.len() > 1 {
        return Err(ApiError::bad_request(format!(
            "Convert takes exactly one file, got {}",
            form.files.len()
        )));
    }

    form.options.format.get_or_insert_with(OutputFormat::default);
    let pipeline = Pipeline::new(form.options);
    let report = pipeline.process(&form.files[0])?;
    let download = report.download.ok_or_else(|| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "No output was produced")
    })?;

    info!(
        file = %download.file_name,
        bytes = download.bytes.len(),
        "serving converted file"
    );

    Ok((
        [
            (header::CONTENT_TYPE, download.media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&download.file_name),
            ),
        ],
        download.bytes,
    )
        .into_response())
}
