use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::ReportWithOwner;
use crate::state::AppState;

use super::parser::UploadForm;

/// Storage path `user_{id}/{millis}_{random}_{name}` for an upload.
pub fn storage_path(owner_id: Uuid, now: DateTime<Utc>, file_name: &str) -> String {
    let nonce: [u8; 4] = rand::random();
    format!(
        "user_{owner_id}/{}_{}_{}",
        now.timestamp_millis(),
        hex::encode(nonce),
        sanitize_file_name(file_name)
    )
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Empty notes default to the uploader's display name.
pub fn effective_notes(notes: Option<&str>, caller: &AuthUser) -> String {
    match notes.map(str::trim).filter(|n| !n.is_empty()) {
        Some(notes) => notes.to_string(),
        None => caller.display_name(),
    }
}

/// Store the file, then record the report.
///
/// Nothing is recorded unless the blob was stored. If recording fails after the
/// blob is stored the blob is left orphaned and the upload reported as failed;
/// the record step is never retried.
pub async fn submit(state: &AppState, caller: &AuthUser, form: UploadForm) -> Result<ReportWithOwner, AppError> {
    let path = storage_path(caller.user_id, Utc::now(), &form.file_name);
    let size = form.content.len();

    match tokio::time::timeout(
        state.config.storage_timeout,
        state.storage.store(&path, form.content),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(AppError::UploadFailed(
                "File storage timed out; please try again".to_string(),
            ));
        }
    }

    let notes = effective_notes(form.notes.as_deref(), caller);

    let report = db::reports::create(&state.pool, caller.user_id, &path, &notes)
        .await
        .map_err(|e| {
            tracing::warn!("Orphaned blob {path}: recording report failed: {e}");
            AppError::UploadFailed("Report could not be recorded; please submit again".to_string())
        })?;

    tracing::info!(
        "Report {} submitted by {} ({size} bytes at {path})",
        report.report.id,
        caller.user_id
    );
    Ok(report)
}
