//! API integration tests
//!
//! Requests go through the full router (body limit, CORS, tracing) with
//! `tower::ServiceExt::oneshot`, so no socket is opened.

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tabclean::api::{build_router, ApiConfig};
use tower::ServiceExt;

const BOUNDARY: &str = "tabclean-test-boundary";

/// Build a multipart body: file parts named `file`, then plain fields
fn multipart_body(files: &[(&str, &str)], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (file_name, content) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(uri: &str, files: &[(&str, &str)], fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files, fields)))
        .unwrap()
}

async fn send_with(config: &ApiConfig, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = build_router(config).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

async fn send(request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    send_with(&ApiConfig::default(), request).await
}

async fn send_json(request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, bytes) = send(request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

const DATA_CSV: &str = "a,b\n1,\n,4\n";

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let (status, json) = send_json(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "healthy");
    assert_eq!(json["request_id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_root_lists_upload_endpoints() {
    let (status, json) = send_json(get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let paths: Vec<&str> = json["data"]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/api/v1/preview"));
    assert!(paths.contains(&"/api/v1/process"));
    assert!(paths.contains(&"/api/v1/convert"));
}

#[tokio::test]
async fn test_version() {
    let (status, json) = send_json(get("/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));
}

// ═══════════════════════════════════════════════════════════════════════════
// PREVIEW
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_preview_first_five_rows() {
    let body = "n,label\n1,a\n2,b\n3,c\n4,d\n5,e\n6,f\n7,g\n";
    let (status, json) = send_json(upload("/api/v1/preview", &[("rows.csv", body)], &[])).await;

    assert_eq!(status, StatusCode::OK);
    let file = &json["data"][0];
    assert_eq!(file["file_name"], "rows.csv");
    assert_eq!(file["success"], true);
    assert_eq!(file["total_rows"], 7);
    assert_eq!(file["preview"]["rows"].as_array().unwrap().len(), 5);
    assert_eq!(file["preview"]["rows"][0], serde_json::json!([1, "a"]));
    assert_eq!(file["preview"]["columns"][0]["dtype"], "Integer");
}

#[tokio::test]
async fn test_preview_rows_field() {
    let body = "n\n1\n2\n3\n";
    let (_, json) = send_json(upload(
        "/api/v1/preview",
        &[("rows.csv", body)],
        &[("preview_rows", "2")],
    ))
    .await;
    assert_eq!(json["data"][0]["preview"]["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_preview_reports_each_file() {
    let (status, json) = send_json(upload(
        "/api/v1/preview",
        &[("notes.txt", "x"), ("data.csv", DATA_CSV)],
        &[],
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["success"], false);
    assert!(json["data"][0]["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported file format"));
    assert_eq!(json["data"][1]["success"], true);
    assert_eq!(json["data"][1]["preview"]["rows"][1], serde_json::json!([null, 4.0]));
}

#[tokio::test]
async fn test_preview_without_files() {
    let (status, json) = send_json(upload("/api/v1/preview", &[], &[("chart", "true")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No files uploaded");
}

#[tokio::test]
async fn test_preview_requires_multipart() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/preview")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, json) = send_json(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

// ═══════════════════════════════════════════════════════════════════════════
// PROCESS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_process_all_steps() {
    let body = "a,b,c\n1,2,x\n,4,y\n";
    let (status, json) = send_json(upload(
        "/api/v1/process",
        &[("data.csv", body)],
        &[
            ("fill_missing", "true"),
            ("drop", "c"),
            ("chart", "on"),
            ("format", "excel"),
        ],
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    let report = &json["data"][0];
    assert_eq!(report["success"], true);
    assert_eq!(report["fill"]["columns"][0]["name"], "a");
    assert_eq!(report["fill"]["columns"][0]["filled"], 1);
    assert_eq!(report["fill"]["columns"][0]["mean"], 1.0);
    assert_eq!(report["filled_preview"]["rows"][1][0], 1.0);
    assert_eq!(report["dropped"], serde_json::json!(["c"]));
    assert_eq!(report["dropped_preview"]["columns"].as_array().unwrap().len(), 2);
    assert_eq!(report["chart"]["series"][0]["name"], "a");
    assert_eq!(report["chart"]["series"][1]["name"], "b");
    assert_eq!(report["chart_skipped"], false);
    assert_eq!(report["download"]["file_name"], "data_cleaned.xlsx");
    assert_eq!(
        report["download"]["media_type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[tokio::test]
async fn test_process_without_options_only_previews() {
    let (_, json) = send_json(upload("/api/v1/process", &[("data.csv", DATA_CSV)], &[])).await;
    let report = &json["data"][0];

    assert_eq!(report["success"], true);
    assert!(report.get("fill").is_none());
    assert!(report.get("chart").is_none());
    assert!(report.get("download").is_none());
}

#[tokio::test]
async fn test_process_chart_skipped_for_text() {
    let (_, json) = send_json(upload(
        "/api/v1/process",
        &[("names.csv", "name\nann\n")],
        &[("chart", "true")],
    ))
    .await;
    assert_eq!(json["data"][0]["chart_skipped"], true);
}

#[tokio::test]
async fn test_process_unknown_drop_is_per_file() {
    let (status, json) = send_json(upload(
        "/api/v1/process",
        &[("one.csv", "a,b\n1,2\n"), ("two.csv", "b\n3\n")],
        &[("drop", "a")],
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["success"], true);
    assert_eq!(json["data"][0]["dropped"], serde_json::json!(["a"]));
    assert_eq!(json["data"][1]["success"], false);
    assert!(json["data"][1]["error"]
        .as_str()
        .unwrap()
        .contains("Unknown column(s): a"));
}

#[tokio::test]
async fn test_process_bad_flag() {
    let (status, json) = send_json(upload(
        "/api/v1/process",
        &[("data.csv", DATA_CSV)],
        &[("fill_missing", "perhaps")],
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("fill_missing"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_convert_csv_download() {
    let (status, headers, body) = send(upload(
        "/api/v1/convert",
        &[("data.csv", DATA_CSV)],
        &[("fill_missing", "true"), ("format", "csv")],
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"data_cleaned.csv\""
    );
    assert_eq!(String::from_utf8(body).unwrap(), "a,b\n1.0,4.0\n1.0,4.0\n");
}

#[tokio::test]
async fn test_convert_defaults_to_csv() {
    let (status, headers, body) = send(upload(
        "/api/v1/convert",
        &[("report.v2.csv", "a,b,c\n1,2,3\n")],
        &[("drop", "b")],
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report_cleaned.csv\""
    );
    assert_eq!(String::from_utf8(body).unwrap(), "a,c\n1,3\n");
}

#[tokio::test]
async fn test_convert_excel_download() {
    let (status, headers, body) = send(upload(
        "/api/v1/convert",
        &[("data.csv", DATA_CSV)],
        &[("format", "xlsx")],
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"data_cleaned.xlsx\""
    );
    // xlsx is a zip archive
    assert_eq!(&body[..2], b"PK");
}

#[tokio::test]
async fn test_convert_rejects_several_files() {
    let (status, json) = send_json(upload(
        "/api/v1/convert",
        &[("a.csv", DATA_CSV), ("b.csv", DATA_CSV)],
        &[],
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("exactly one file"));
}

#[tokio::test]
async fn test_convert_unsupported_file() {
    let (status, json) = send_json(upload("/api/v1/convert", &[("notes.txt", "x")], &[])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_convert_unknown_column() {
    let (status, json) = send_json(upload(
        "/api/v1/convert",
        &[("data.csv", DATA_CSV)],
        &[("drop", "zz")],
    ))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("zz"));
}

#[tokio::test]
async fn test_convert_unknown_format() {
    let (status, json) = send_json(upload(
        "/api/v1/convert",
        &[("data.csv", DATA_CSV)],
        &[("format", "pdf")],
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("pdf"));
}

// ═══════════════════════════════════════════════════════════════════════════
// LIMITS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_upload_over_limit() {
    let config = ApiConfig {
        max_upload_bytes: 64,
        ..Default::default()
    };
    let content = format!("a\n{}\n", "1".repeat(4096));

    let (status, _, _) = send_with(
        &config,
        upload("/api/v1/preview", &[("big.csv", content.as_str())], &[]),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
