//! Axum route handlers for the Template API.

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::rules::{normalize, RuleSet};
use crate::state::AppState;
use crate::template::{generate_template, DOCX_CONTENT_TYPE};
use crate::upload::read_upload;

/// Which path produced the rules behind a generated template.
pub const RULE_SOURCE_HEADER: &str = "x-rule-source";

async fn render_off_thread(rules: RuleSet) -> Result<Vec<u8>, AppError> {
    let bytes = tokio::task::spawn_blocking(move || generate_template(&rules))
        .await
        .context("template generation task panicked")?;
    Ok(bytes)
}

fn docx_response(bytes: Vec<u8>, stem: &str, source: Option<&str>) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"template_{stem}.docx\""
    ))
    .context("invalid content-disposition header")?;

    let mut response = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(DOCX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response();

    if let Some(source) = source {
        response.headers_mut().insert(
            HeaderName::from_static(RULE_SOURCE_HEADER),
            HeaderValue::from_str(source).context("invalid rule source header")?,
        );
    }
    Ok(response)
}

/// POST /api/v1/templates
///
/// Multipart `file` → extracted rules → `.docx` attachment.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_upload(multipart).await?;
    let staged = upload.stage().await?;

    let extraction = state.extractor.extract_from_path(staged.path()).await;
    let source = extraction.source.label();
    let bytes = render_off_thread(extraction.rules).await?;

    info!(
        "Generated template for {} ({} bytes, rules from {source})",
        upload.file_name,
        bytes.len()
    );
    docx_response(bytes, &upload.safe_stem(), Some(source))
}

/// POST /api/v1/templates/render
///
/// Raw rule JSON (any shape) → normalized → `.docx` attachment.
/// Non-object bodies normalize to the fallback rules.
pub async fn handle_render(Json(raw): Json<Value>) -> Result<Response, AppError> {
    let bytes = render_off_thread(normalize(&raw)).await?;
    docx_response(bytes, "rules", None)
}
