//! Handlers for the `/admin` user and surveyor management endpoints.
//!
//! All handlers require the `Admin` role via [`RequireAdmin`].

use aquasurvey_core::error::CoreError;
use aquasurvey_core::roles::{validate_role, ROLE_SURVEYOR};
use aquasurvey_core::types::DbId;
use aquasurvey_db::models::survey::{SurveyResponse, SurveyStats};
use aquasurvey_db::models::user::{CreateUser, UserResponse};
use aquasurvey_db::repositories::{SurveyRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::handlers::survey::to_responses;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted display name, matching the `users.name` check constraint.
const MAX_NAME_LENGTH: usize = 80;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), CoreError> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > MAX_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Name must be between 1 and {MAX_NAME_LENGTH} characters"
            )));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::Validation("A valid email is required".into()));
        }
        validate_role(&self.role).map_err(CoreError::Validation)?;
        validate_password_strength(&self.password, MIN_PASSWORD_LENGTH)
            .map_err(CoreError::Validation)?;
        Ok(())
    }
}

/// Response body for `DELETE /admin/surveyors/{id}`.
#[derive(Debug, Serialize)]
pub struct DeletedSurveyor {
    pub id: DbId,
    /// Surveys removed along with the surveyor.
    pub deleted_surveys: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Register a user. A duplicate email is rejected with 409 by the
/// `uq_users_email` constraint.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash,
        role: input.role,
    };

    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = user.id,
        role = %user.role,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// GET /api/v1/admin/surveyors
pub async fn list_surveyors(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_by_role(&state.pool, ROLE_SURVEYOR).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/surveyors/{id}/surveys
///
/// All surveys submitted by one surveyor, newest first.
pub async fn list_surveyor_surveys(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SurveyResponse>>>> {
    let surveys = SurveyRepo::list_for_user(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: to_responses(surveys)?,
    }))
}

/// DELETE /api/v1/admin/surveyors/{id}
///
/// Delete a surveyor and every survey they submitted. Ids that do not
/// belong to a surveyor are 404.
pub async fn delete_surveyor(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeletedSurveyor>>> {
    let deleted_surveys = UserRepo::delete_surveyor(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Surveyor",
            id,
        }))?;

    tracing::info!(
        admin_id = admin.user_id,
        surveyor_id = id,
        deleted_surveys,
        "Surveyor deleted"
    );

    Ok(Json(DataResponse {
        data: DeletedSurveyor {
            id,
            deleted_surveys,
        },
    }))
}

/// GET /api/v1/admin/stats
///
/// Survey counts overall and by status.
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SurveyStats>>> {
    let stats = SurveyRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
