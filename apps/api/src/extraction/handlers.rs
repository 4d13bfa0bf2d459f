//! Axum route handlers for the Extraction API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::errors::AppError;
use crate::extraction::extractor::Extraction;
use crate::extraction::sample::{SAMPLE_FILE_NAME, SAMPLE_GUIDELINE};
use crate::state::AppState;
use crate::upload::read_upload;

/// POST /api/v1/rules/extract
///
/// Multipart `file` (.txt or .docx) → `{ rules, source }`.
/// Extraction problems show up as `source.kind = "fallback"`, never as an error status.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Extraction>, AppError> {
    let upload = read_upload(multipart).await?;
    let staged = upload.stage().await?;

    let extraction = state.extractor.extract_from_path(staged.path()).await;

    Ok(Json(extraction))
}

/// GET /api/v1/examples/guideline
///
/// A sample `.txt` guideline to try the extractor with.
pub async fn handle_sample_guideline() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SAMPLE_FILE_NAME}\""),
            ),
        ],
        SAMPLE_GUIDELINE,
    )
}
