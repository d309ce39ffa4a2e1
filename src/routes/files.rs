use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SignedParams {
    pub expires: i64,
    pub signature: String,
}

/// Serves a blob from the filesystem store behind a signed, expiring link.
pub async fn download(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    Query(params): Query<SignedParams>,
) -> Result<Response, Response> {
    let denied = || (StatusCode::FORBIDDEN, Json(json!({"error": "Invalid or expired link"}))).into_response();

    state
        .local_files
        .verify(&path, params.expires, &params.signature)
        .map_err(|e| {
            tracing::debug!("Rejected download of {path}: {e}");
            denied()
        })?;

    let content = state.local_files.read(&path).await.map_err(|e| {
        tracing::warn!("Signed download of {path} failed: {e}");
        (StatusCode::NOT_FOUND, Json(json!({"error": "File not found"}))).into_response()
    })?;

    let file_name = path.rsplit('/').next().unwrap_or("report");

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        content,
    )
        .into_response())
}
