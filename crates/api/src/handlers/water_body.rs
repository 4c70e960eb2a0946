//! Handlers for water-body summaries and health statuses.
//!
//! Summaries are recomputed from verified surveys on every request.

use aquasurvey_core::aggregation::{
    best_match, summarize_location, summarize_verified, WaterBodySummary,
};
use aquasurvey_core::error::CoreError;
use aquasurvey_core::health::{score_locations, HealthScoreResult};
use aquasurvey_db::models::survey::SurveyResponse;
use aquasurvey_db::repositories::SurveyRepo;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::survey::to_responses;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /water-bodies/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// A single water body with the surveys behind its averages.
#[derive(Debug, Serialize)]
pub struct WaterBodyDetail {
    pub summary: WaterBodySummary,
    pub surveys: Vec<SurveyResponse>,
}

/// GET /api/v1/water-bodies
pub async fn list_summaries(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<WaterBodySummary>>>> {
    let surveys = SurveyRepo::list_verified(&state.pool).await?;
    Ok(Json(DataResponse {
        data: summarize_verified(&surveys),
    }))
}

/// GET /api/v1/water-bodies/{name}
///
/// Exact-name lookup. 404 when no verified survey carries the name.
pub async fn get_summary(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<WaterBodyDetail>>> {
    let surveys = SurveyRepo::list_verified_at(&state.pool, &name).await?;
    let (summary, _) = summarize_location(&surveys, &name)?;
    let surveys = to_responses(surveys)?;

    Ok(Json(DataResponse {
        data: WaterBodyDetail { summary, surveys },
    }))
}

/// GET /api/v1/water-bodies/search?q=
///
/// Best summary for a loosely typed name, e.g. "ganga varanasi" finds
/// "Ganga River - Varanasi".
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<WaterBodySummary>>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Search query must not be empty".into(),
        )));
    }

    let surveys = SurveyRepo::list_verified(&state.pool).await?;
    let summaries = summarize_verified(&surveys);
    let found = best_match(&summaries, query).cloned().ok_or_else(|| {
        AppError::Core(CoreError::NotFoundNamed {
            entity: "WaterBody",
            name: query.to_string(),
        })
    })?;

    Ok(Json(DataResponse { data: found }))
}

/// GET /api/v1/admin/water-bodies/status
///
/// Health score of the latest survey at every location. Which surveys count
/// is set by `HEALTH_SCORE_SCOPE`.
pub async fn health_statuses(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<HealthScoreResult>>>> {
    let surveys = SurveyRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse {
        data: score_locations(&surveys, state.config.health_scope),
    }))
}
