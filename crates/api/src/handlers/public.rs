//! Public counters shown on the landing page.

use aquasurvey_core::roles::ROLE_SURVEYOR;
use aquasurvey_db::repositories::{SurveyRepo, UserRepo};
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublicStats {
    pub total_surveys: i64,
    pub total_surveyors: i64,
}

/// GET /api/v1/public/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<DataResponse<PublicStats>>> {
    let survey_stats = SurveyRepo::stats(&state.pool).await?;
    let total_surveyors = UserRepo::count_by_role(&state.pool, ROLE_SURVEYOR).await?;

    Ok(Json(DataResponse {
        data: PublicStats {
            total_surveys: survey_stats.total,
            total_surveyors,
        },
    }))
}
