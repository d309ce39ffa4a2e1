use sqlx::PgPool;

use crate::auth::jwt::Claims;
use crate::db;
use crate::error::AppError;
use crate::models::User;

/// Maps a verified session to its `User` row, creating the row on first sight.
///
/// Creation is a single conditional insert keyed on the provider's user id, so
/// concurrent first logins converge on one row. A failure here is not cached:
/// the request is treated as unauthenticated and the next one tries again.
pub async fn resolve(pool: &PgPool, claims: &Claims) -> Result<User, AppError> {
    let created = db::users::insert_if_absent(
        pool,
        claims.sub,
        &claims.email,
        claims.user_metadata.first_name.trim(),
        claims.user_metadata.last_name.trim(),
    )
    .await;

    let user = match created {
        Ok(Some(user)) => Some(user),
        // A concurrent first login committed after our statement's snapshot.
        Ok(None) => match db::users::find_by_id(pool, claims.sub).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Failed to re-read profile for {}: {e}", claims.sub);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to resolve profile for {}: {e}", claims.sub);
            None
        }
    };

    user.ok_or_else(|| AppError::Unauthenticated("Unable to resolve user profile".to_string()))
}
