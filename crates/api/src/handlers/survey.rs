//! Handlers for the surveyor-facing `/surveys` resource.
//!
//! All handlers require the `Surveyor` role via [`RequireSurveyor`].

use aquasurvey_core::error::CoreError;
use aquasurvey_core::location::Location;
use aquasurvey_core::measurement::{validate_measurements, Measurements};
use aquasurvey_core::types::{DbId, Timestamp};
use aquasurvey_db::models::survey::{CreateSurvey, SurveyResponse};
use aquasurvey_db::repositories::SurveyRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSurveyor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted photo URL or storage id.
const MAX_PHOTO_FIELD_LENGTH: usize = 2048;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Optional photo evidence attached to a submission.
#[derive(Debug, Deserialize)]
pub struct PhotoProofInput {
    pub url: Option<String>,
    #[serde(alias = "publicId")]
    pub public_id: Option<String>,
}

/// Request body for `POST /surveys`.
#[derive(Debug, Deserialize)]
pub struct CreateSurveyRequest {
    pub location: Location,
    pub measurements: Measurements,
    /// Device clock at the time of measurement, distinct from receipt time.
    #[serde(alias = "surveyorTime")]
    pub surveyor_time: Timestamp,
    #[serde(default, alias = "photoProof")]
    pub photo_proof: Option<PhotoProofInput>,
}

fn photo_field(value: Option<String>, field: &str) -> Result<Option<String>, CoreError> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if let Some(v) = &value {
        if v.len() > MAX_PHOTO_FIELD_LENGTH {
            return Err(CoreError::Validation(format!(
                "photo_proof.{field} must be at most {MAX_PHOTO_FIELD_LENGTH} bytes"
            )));
        }
    }
    Ok(value)
}

/// Convert rows into their API shape, failing on any corrupt status.
pub(crate) fn to_responses<T>(rows: Vec<T>) -> Result<Vec<SurveyResponse>, CoreError>
where
    SurveyResponse: TryFrom<T, Error = CoreError>,
{
    rows.into_iter().map(SurveyResponse::try_from).collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/surveys
///
/// Submit a new survey. The location is validated, the automatic range
/// checks run once, and the survey is stored as pending.
pub async fn create_survey(
    RequireSurveyor(user): RequireSurveyor,
    State(state): State<AppState>,
    Json(input): Json<CreateSurveyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SurveyResponse>>)> {
    input.location.validate()?;
    let auto_checks = validate_measurements(&input.measurements)?;

    let (photo_url, photo_public_id) = match input.photo_proof {
        Some(photo) => (
            photo_field(photo.url, "url")?,
            photo_field(photo.public_id, "public_id")?,
        ),
        None => (None, None),
    };

    let location = Location {
        name: input.location.name.trim().to_string(),
        ..input.location
    };

    let create = CreateSurvey {
        user_id: user.user_id,
        location,
        measurements: input.measurements,
        photo_url,
        photo_public_id,
        surveyor_time: input.surveyor_time,
        auto_checks,
    };

    let survey = SurveyRepo::create(&state.pool, &create).await?;

    tracing::info!(
        user_id = user.user_id,
        survey_id = survey.id,
        location = %survey.location_name,
        anomaly_score = survey.anomaly_score,
        issues = ?auto_checks.issues(),
        "Survey submitted"
    );

    let response = SurveyResponse::try_from(survey)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/surveys/mine
///
/// List the caller's own surveys, newest first.
pub async fn list_my_surveys(
    RequireSurveyor(user): RequireSurveyor,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SurveyResponse>>>> {
    let surveys = SurveyRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: to_responses(surveys)?,
    }))
}

/// GET /api/v1/surveys/mine/{id}
///
/// Fetch one of the caller's surveys. Another surveyor's survey is 403.
pub async fn get_my_survey(
    RequireSurveyor(user): RequireSurveyor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SurveyResponse>>> {
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;

    if survey.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not allowed to view this survey".into(),
        )));
    }

    Ok(Json(DataResponse {
        data: SurveyResponse::try_from(survey)?,
    }))
}
