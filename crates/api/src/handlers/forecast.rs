//! Handler for the public `/forecast` endpoint.

use aquasurvey_core::forecast::{Forecast, ForecastRequest};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/forecast
///
/// Predict the next readings for a location from its history. Each call
/// goes to the completion service; nothing is cached or retried.
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<ForecastRequest>,
) -> AppResult<Json<DataResponse<Forecast>>> {
    input.validate()?;

    tracing::debug!(
        location = %input.location,
        history_len = input.history.len(),
        has_current = input.current.is_some(),
        "Requesting forecast"
    );

    let forecast = state.forecast.predict(&input).await?;
    Ok(Json(DataResponse { data: forecast }))
}
