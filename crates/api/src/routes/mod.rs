pub mod admin;
pub mod auth;
pub mod health;
pub mod survey;
pub mod water_body;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /surveys                                         submit (surveyor)
/// /surveys/mine                                    own surveys (surveyor)
/// /surveys/mine/{id}                               own survey detail (surveyor)
///
/// /admin/surveys                                   all surveys (admin)
/// /admin/surveys/pending                           review queue
/// /admin/surveys/{id}                              detail
/// /admin/surveys/{id}/verify                       verify (PATCH)
/// /admin/surveys/{id}/flag                         flag (PATCH)
/// /admin/surveyors                                 list surveyors
/// /admin/surveyors/{id}                            delete surveyor (DELETE, cascades)
/// /admin/surveyors/{id}/surveys                    one surveyor's surveys
/// /admin/users                                     register user (POST)
/// /admin/stats                                     survey counts
/// /admin/water-bodies/status                       health scores
///
/// /water-bodies                                    verified summaries (public)
/// /water-bodies/search?q=                          best name match (public)
/// /water-bodies/{name}                             one summary + surveys (public)
///
/// /public/stats                                    landing counters (public)
/// /forecast                                        forecast (POST, public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/surveys", survey::router())
        .nest("/admin", admin::router())
        .nest("/water-bodies", water_body::router())
        .route("/public/stats", get(handlers::public::stats))
        .route("/forecast", post(handlers::forecast::predict))
}
