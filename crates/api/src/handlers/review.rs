//! Handlers for the admin-facing `/admin/surveys` resource: listings and
//! review decisions.
//!
//! All handlers require the `Admin` role via [`RequireAdmin`].

use aquasurvey_core::error::CoreError;
use aquasurvey_core::review::{plan_review, version_conflict, ReviewDecision};
use aquasurvey_core::types::DbId;
use aquasurvey_db::models::survey::{RecordReview, SurveyResponse};
use aquasurvey_db::repositories::SurveyRepo;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::survey::to_responses;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PATCH /admin/surveys/{id}/verify`.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    pub comments: Option<String>,
    /// When set, the review only applies if the survey is still at this version.
    pub expected_version: Option<i32>,
}

/// Request body for `PATCH /admin/surveys/{id}/flag`.
#[derive(Debug, Default, Deserialize)]
pub struct FlagRequest {
    pub comments: Option<String>,
    #[serde(default, alias = "flaggedReasons", alias = "flagged_reasons")]
    pub reasons: Vec<String>,
    pub expected_version: Option<i32>,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/surveys
///
/// Every survey with its surveyor's identity, newest first.
pub async fn list_surveys(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SurveyResponse>>>> {
    let rows = SurveyRepo::list_all_with_surveyor(&state.pool).await?;
    Ok(Json(DataResponse {
        data: to_responses(rows)?,
    }))
}

/// GET /api/v1/admin/surveys/pending
///
/// Surveys awaiting review, newest first.
pub async fn list_pending(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SurveyResponse>>>> {
    let rows = SurveyRepo::list_pending_with_surveyor(&state.pool).await?;
    Ok(Json(DataResponse {
        data: to_responses(rows)?,
    }))
}

/// GET /api/v1/admin/surveys/{id}
pub async fn get_survey(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SurveyResponse>>> {
    let row = SurveyRepo::find_with_surveyor(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;
    Ok(Json(DataResponse {
        data: SurveyResponse::try_from(row)?,
    }))
}

// ---------------------------------------------------------------------------
// Review decisions
// ---------------------------------------------------------------------------

/// PATCH /api/v1/admin/surveys/{id}/verify
///
/// Mark a survey verified. Re-verifying is allowed and re-stamps the review.
pub async fn verify_survey(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<VerifyRequest>>,
) -> AppResult<Json<DataResponse<SurveyResponse>>> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let decision = ReviewDecision::Verify {
        comments: input.comments,
    };
    apply_review(&state, admin.user_id, id, decision, input.expected_version).await
}

/// PATCH /api/v1/admin/surveys/{id}/flag
///
/// Flag a survey for resurvey, keeping the reasons in the order given.
pub async fn flag_survey(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<FlagRequest>>,
) -> AppResult<Json<DataResponse<SurveyResponse>>> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let decision = ReviewDecision::Flag {
        comments: input.comments,
        reasons: input.reasons,
    };
    apply_review(&state, admin.user_id, id, decision, input.expected_version).await
}

/// Validate a decision, write it, and tell a missing survey apart from a
/// lost compare-and-swap.
async fn apply_review(
    state: &AppState,
    reviewer_id: DbId,
    survey_id: DbId,
    decision: ReviewDecision,
    expected_version: Option<i32>,
) -> AppResult<Json<DataResponse<SurveyResponse>>> {
    let update = plan_review(decision)?;
    let status = update.status;

    let input = RecordReview {
        reviewer_id,
        update,
        expected_version,
    };

    let Some(survey) = SurveyRepo::record_review(&state.pool, survey_id, &input).await? else {
        let current = SurveyRepo::find_by_id(&state.pool, survey_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Survey",
                id: survey_id,
            }))?;
        let expected = expected_version.unwrap_or(current.version);
        tracing::warn!(
            survey_id,
            reviewer_id,
            expected_version = expected,
            actual_version = current.version,
            "Review lost a concurrent update"
        );
        return Err(AppError::Core(version_conflict(
            survey_id,
            expected,
            current.version,
        )));
    };

    tracing::info!(
        user_id = reviewer_id,
        survey_id,
        status = status.as_str(),
        version = survey.version,
        "Survey reviewed"
    );

    Ok(Json(DataResponse {
        data: SurveyResponse::try_from(survey)?,
    }))
}
