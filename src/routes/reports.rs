use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::{ReportStatus, ReportWithOwner};
use crate::report::query::ListParams;
use crate::report::service::{self, FileLink, ReportPage};
use crate::report::{parser, upload};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ReportPage>, AppError> {
    Ok(Json(service::find(&state, &auth, &params).await?))
}

pub async fn list_my(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ReportPage>, AppError> {
    Ok(Json(service::find_own(&state, &auth, &params).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ReportWithOwner>), AppError> {
    let form = parser::parse_upload(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let report = upload::submit(&state, &auth, form).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportWithOwner>, AppError> {
    Ok(Json(service::get(&state, &auth, id).await?))
}

pub async fn update_notes(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<Json<ReportWithOwner>, AppError> {
    Ok(Json(service::update_notes(&state, &auth, id, &req.notes).await?))
}

pub async fn update_status(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ReportWithOwner>, AppError> {
    let next: ReportStatus = req
        .status
        .parse()
        .map_err(|e: crate::models::UnknownStatus| AppError::InvalidStatus(e.to_string()))?;

    Ok(Json(service::update_status(&state, &auth, id, next).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    service::delete(&state, &auth, id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

pub async fn file_link(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileLink>, AppError> {
    Ok(Json(service::file_link(&state, &auth, id).await?))
}
