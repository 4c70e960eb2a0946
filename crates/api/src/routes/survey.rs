//! Route definitions for the surveyor-facing `/surveys` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::survey;
use crate::state::AppState;

/// Routes mounted at `/surveys`.
///
/// ```text
/// POST   /              -> create_survey
/// GET    /mine          -> list_my_surveys
/// GET    /mine/{id}     -> get_my_survey
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(survey::create_survey))
        .route("/mine", get(survey::list_my_surveys))
        .route("/mine/{id}", get(survey::get_my_survey))
}
