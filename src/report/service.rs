use serde::Serialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Report, ReportStatus, ReportWithOwner};
use crate::state::AppState;

use super::access::{self, QueryScope};
use super::query::{ListParams, Page, ReportQuery, UploaderFilter};

#[derive(Debug, Serialize)]
pub struct ReportPage {
    pub items: Vec<ReportWithOwner>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct FileLink {
    pub url: String,
    pub expires_in: u64,
}

/// Loads a report or fails with `NotFound`. Always runs before any permission check.
async fn load(state: &AppState, id: Uuid) -> Result<Report, AppError> {
    let pool = &state.pool;
    db::read_with_retry(move || db::reports::find_by_id(pool, id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("report {id} does not exist")))
}

/// Lists the reports visible under the caller's role scope.
pub async fn find(state: &AppState, caller: &AuthUser, params: &ListParams) -> Result<ReportPage, AppError> {
    find_scoped(state, access::scope_for_query(caller), params).await
}

/// Lists only the caller's own reports, whatever their role.
pub async fn find_own(state: &AppState, caller: &AuthUser, params: &ListParams) -> Result<ReportPage, AppError> {
    find_scoped(state, QueryScope::Owner(caller.user_id), params).await
}

async fn find_scoped(state: &AppState, scope: QueryScope, params: &ListParams) -> Result<ReportPage, AppError> {
    let parsed = params.parse()?;
    let page = Page {
        index: parsed.page_index,
        size: state.config.page_size,
    };
    let pool = &state.pool;

    let owner_filter = match &parsed.filters.uploader {
        None => None,
        Some(UploaderFilter::Id(id)) => Some(vec![*id]),
        Some(UploaderFilter::Name(name)) => {
            let name = name.as_str();
            Some(db::read_with_retry(move || db::users::find_ids_by_display_name(pool, name)).await?)
        }
    };

    let query = ReportQuery::new(
        scope,
        &parsed.filters,
        owner_filter,
        parsed.sort,
        parsed.direction,
        page,
    );
    let query = &query;

    let items = db::read_with_retry(move || db::reports::list(pool, query)).await?;
    let total_count = db::read_with_retry(move || db::reports::count(pool, query)).await?;

    Ok(ReportPage {
        items,
        total_count,
        page: page.index,
        page_size: page.size,
    })
}

pub async fn get(state: &AppState, caller: &AuthUser, id: Uuid) -> Result<ReportWithOwner, AppError> {
    let report = load(state, id).await?;
    access::require(access::can_view(caller, &report), caller, "view", &report)?;

    let pool = &state.pool;
    db::read_with_retry(move || db::reports::find_with_owner(pool, id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("report {id} does not exist")))
}

pub async fn update_notes(
    state: &AppState,
    caller: &AuthUser,
    id: Uuid,
    notes: &str,
) -> Result<ReportWithOwner, AppError> {
    let report = load(state, id).await?;
    access::require(access::can_edit_notes(caller, &report), caller, "edit", &report)?;

    let updated = db::reports::update_notes(&state.pool, id, notes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("report {id} does not exist")))?;

    tracing::info!("Report {id} notes updated by {}", caller.user_id);
    Ok(updated)
}

/// Moves a report to `next`. The write is conditional on the status the decision
/// was made against; if another writer got there first the report is reloaded
/// and the decision is taken again against the persisted status.
pub async fn update_status(
    state: &AppState,
    caller: &AuthUser,
    id: Uuid,
    next: ReportStatus,
) -> Result<ReportWithOwner, AppError> {
    const MAX_ATTEMPTS: usize = 2;

    for _ in 0..MAX_ATTEMPTS {
        let report = load(state, id).await?;
        access::authorize_status_change(caller, &report, next)?;

        if let Some(updated) =
            db::reports::transition_status(&state.pool, id, report.status, next).await?
        {
            tracing::info!(
                "Report {id} moved {} -> {next} by {}",
                report.status,
                caller.user_id
            );
            return Ok(updated);
        }

        tracing::debug!("Status of report {id} changed concurrently, re-checking");
    }

    Err(AppError::InvalidStatus(
        "Report status changed while updating; reload and try again".to_string(),
    ))
}

/// Deletes the row, then the blob. A blob that cannot be removed is logged and
/// left behind; the request still succeeds.
pub async fn delete(state: &AppState, caller: &AuthUser, id: Uuid) -> Result<(), AppError> {
    let report = load(state, id).await?;
    access::require(access::can_delete(caller, &report), caller, "delete", &report)?;

    let deleted = db::reports::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("report {id} does not exist")));
    }
    tracing::info!("Report {id} deleted by {}", caller.user_id);

    match tokio::time::timeout(
        state.config.storage_timeout,
        state.storage.remove(&report.file_path),
    )
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Orphaned blob {} for deleted report {id}: {e}", report.file_path),
        Err(_) => tracing::warn!(
            "Orphaned blob {} for deleted report {id}: removal timed out",
            report.file_path
        ),
    }

    Ok(())
}

pub async fn file_link(state: &AppState, caller: &AuthUser, id: Uuid) -> Result<FileLink, AppError> {
    let report = load(state, id).await?;
    access::require(access::can_view(caller, &report), caller, "download", &report)?;

    let ttl = state.config.signed_url_ttl;
    let url = tokio::time::timeout(
        state.config.storage_timeout,
        state.storage.signed_url(&report.file_path, ttl),
    )
    .await
    .map_err(|_| AppError::Internal("Signing download link timed out".to_string()))?
    .map_err(|e| AppError::Internal(format!("Signing download link failed: {e}")))?;

    Ok(FileLink {
        url,
        expires_in: ttl.as_secs(),
    })
}
