//! Bearer-token identity for surveyors and admins.

use aquasurvey_core::error::CoreError;
use aquasurvey_core::types::DbId;
use aquasurvey_db::repositories::UserRepo;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The caller behind `Authorization: Bearer <token>`.
///
/// The token must verify and its subject must still be a stored account, so
/// a surveyor deleted mid-session is turned away with 401 even while the
/// token has not expired. The role comes from the stored account.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// `"Admin"` or `"Surveyor"`.
    pub role: String,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let Some(user) = UserRepo::find_by_id(&state.pool, claims.sub).await? else {
            tracing::info!(user_id = claims.sub, "Token presented for a deleted account");
            return Err(unauthorized("Account no longer exists"));
        };

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
        })
    }
}
