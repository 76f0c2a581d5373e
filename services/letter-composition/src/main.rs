//! Parent Letter Composition Service
//! 
//! Imports gradebook exports and renders parent letters that combine grades,
//! missing work and parsed attendance.

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use reportcard_utils::{init_logging, AppConfig, ErrorResponse, ParsedGradebook, ReportError};

mod service;
mod template_engine;

use service::{LetterService, RenderLettersRequest, TemplateInfo};
use template_engine::LetterBatch;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    info!("Starting Parent Letter Composition Service");

    let service = LetterService::new(config.letters.clone())?;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/gradebook/parse", post(parse_gradebook))
        .route("/api/v1/letters/render", post(render_letters))
        .route("/api/v1/templates", get(list_templates))
        .layer(DefaultBodyLimit::max(config.server.max_request_size))
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.letter_composition_port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Letter Composition Service listening on {}", addr);

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
        "service": "letter-composition",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Upload and parse a gradebook export
async fn parse_gradebook(
    State(service): State<LetterService>,
    mut multipart: Multipart,
) -> Result<Json<ParsedGradebook>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| api_error(ReportError::validation("file", format!("Upload error: {}", e))))?
        .ok_or_else(|| api_error(ReportError::validation("file", "No file provided")))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let content_type = field.content_type().map(|s| s.to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| api_error(ReportError::validation("file", format!("Read error: {}", e))))?;

    let gradebook = service
        .parse_gradebook(&filename, content_type.as_deref(), &data)
        .map_err(api_error)?;

    Ok(Json(gradebook))
}

async fn render_letters(
    State(service): State<LetterService>,
    Json(request): Json<RenderLettersRequest>,
) -> Result<Json<LetterBatch>, ApiError> {
    let batch = service.render_letters(&request).map_err(api_error)?;
    Ok(Json(batch))
}

/// Template list response
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateInfo>,
}

async fn list_templates(State(service): State<LetterService>) -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: service.list_templates(),
    })
}
