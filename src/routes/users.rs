use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<User>, AppError> {
    let pool = &state.pool;
    let id = auth.user_id;
    let user = db::read_with_retry(move || db::users::find_by_id(pool, id))
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;
    Ok(Json(user))
}

/// Updates the caller's own name. Email belongs to the identity provider and
/// role can only be changed outside this service.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let first_name = req.first_name.trim();
    let last_name = req.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::BadRequest(
            "First and last name are required".to_string(),
        ));
    }

    let user = db::users::update_profile(&state.pool, auth.user_id, first_name, last_name)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;

    tracing::info!("User {} updated their profile", user.id);
    Ok(Json(user))
}

/// Users who own at least one report, for the uploader filter. Managers only.
pub async fn reporters(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    auth.require_manager()?;
    let pool = &state.pool;
    let users = db::read_with_retry(move || db::users::list_reporters(pool)).await?;
    Ok(Json(users))
}
