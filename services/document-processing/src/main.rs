//! Attendance Document Processing Service
//! 
//! Accepts attendance audit PDFs and turns them into per-student attendance
//! records.

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use reportcard_utils::{init_logging, AppConfig, AttendanceExtractor, ErrorResponse, ParserConfig, ReportError};

mod extraction;
mod pdf_processor;

use extraction::{AttendanceService, AuditExtraction, AuditStatus, StudentAttendance};

type ApiError = (StatusCode, Json<ErrorResponse>);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    info!("Starting Attendance Document Processing Service");

    let parser_config = ParserConfig::from_settings(&config.parser)
        .context("Invalid attendance parser configuration")?;
    let service = AttendanceService::new(AttendanceExtractor::new(parser_config));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/attendance/upload", post(upload_audit))
        .route("/api/v1/attendance/parse-text", post(parse_text))
        .route("/api/v1/attendance/:id", get(get_audit))
        .route("/api/v1/attendance/:id/extract", post(extract_audit))
        .layer(DefaultBodyLimit::max(config.server.max_request_size))
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.document_processing_port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Document Processing Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn api_error(error: ReportError) -> ApiError {
    let status = StatusCode::from_u16(error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(error)))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "document-processing",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Audit upload response
#[derive(Debug, Serialize)]
pub struct AuditUploadResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub size_bytes: usize,
    pub status: AuditStatus,
}

/// Upload attendance audit PDF
async fn upload_audit(
    State(service): State<AttendanceService>,
    mut multipart: Multipart,
) -> Result<Json<AuditUploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| api_error(ReportError::validation("file", format!("Upload error: {}", e))))?
        .ok_or_else(|| api_error(ReportError::validation("file", "No file provided")))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/pdf".to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| api_error(ReportError::validation("file", format!("Read error: {}", e))))?;

    let document_id = service.store_document(&filename, &content_type, &data).await;
    info!(%document_id, %filename, size = data.len(), "Stored attendance audit");

    Ok(Json(AuditUploadResponse {
        document_id,
        filename,
        file_type: content_type,
        size_bytes: data.len(),
        status: AuditStatus::Uploaded,
    }))
}

/// Audit metadata with any extraction result
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub upload_date: String,
    pub status: AuditStatus,
    pub error: Option<String>,
    pub students: Vec<StudentAttendance>,
    pub extraction: Option<AuditExtraction>,
}

async fn get_audit(
    State(service): State<AttendanceService>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuditResponse>, ApiError> {
    let audit = service.get_document(id).await.map_err(api_error)?;

    Ok(Json(AuditResponse {
        document_id: audit.id,
        filename: audit.filename,
        file_type: audit.file_type,
        upload_date: audit.upload_date,
        status: audit.status,
        error: audit.error,
        students: audit
            .extraction
            .as_ref()
            .map(AuditExtraction::student_summaries)
            .unwrap_or_default(),
        extraction: audit.extraction,
    }))
}

/// Trigger extraction for an audit
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub document_id: Uuid,
    pub status: AuditStatus,
    pub pages: usize,
    pub students_found: usize,
    pub rows_skipped: usize,
    pub needs_review: bool,
}

async fn extract_audit(
    State(service): State<AttendanceService>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let extraction = service.extract(id).await.map_err(api_error)?;

    Ok(Json(ExtractResponse {
        document_id: id,
        status: AuditStatus::Extracted,
        pages: extraction.page_count,
        students_found: extraction.records.len(),
        rows_skipped: extraction.summary.rows_skipped,
        needs_review: !extraction.validation.is_valid || extraction.validation.warning_count > 0,
    }))
}

/// Page texts extracted by the caller
#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub pages: Vec<String>,
}

async fn parse_text(
    State(service): State<AttendanceService>,
    Json(request): Json<ParseTextRequest>,
) -> Json<AuditExtraction> {
    Json(service.parse_pages(&request.pages))
}
