use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::{identity, jwt};
use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::SharedState;

/// The resolved caller of a request. Passed explicitly into every report operation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl AuthUser {
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    pub fn display_name(&self) -> String {
        crate::models::user::display_name(&self.first_name, &self.last_name, &self.email)
    }

    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.is_manager() {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Manager access required".to_string()))
        }
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(auth_header) = parts.headers.get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthenticated("Invalid authorization header".to_string()))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(Some(token.to_string()));
        }
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar.get("access_token").map(|cookie| cookie.value().to_string()))
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(|| {
            AppError::Unauthenticated("Missing authentication token".to_string())
        })?;

        let claims = jwt::decode_token(&token, &state.config.identity_jwt_secret)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

        let user = identity::resolve(&state.pool, &claims).await?;
        Ok(AuthUser::from(user))
    }
}
