//! Handlers for the `/auth` resource.

use std::sync::LazyLock;

use aquasurvey_core::error::CoreError;
use aquasurvey_core::types::DbId;
use aquasurvey_db::repositories::UserRepo;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Hash checked when no account matches the email.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no-such-account-password").ok());

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and return an access token. Unknown
/// emails and wrong passwords get the same 401 so accounts cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let Some(user) = UserRepo::find_by_email(&state.pool, input.email.trim()).await? else {
        // Do the same Argon2 work as for a registered email.
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify_password(&input.password, hash);
        }
        return Err(invalid_credentials());
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.ttl_secs(),
        user: UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_hash_costs_a_full_verification() {
        let hash = DUMMY_HASH.as_deref().expect("dummy hash should be computed");
        assert!(hash.starts_with("$argon2id$"));
        // Parses and runs to a mismatch instead of failing fast on a bad hash.
        assert_eq!(verify_password("clear-water-123", hash).ok(), Some(false));
    }
}
