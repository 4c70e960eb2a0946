//! Route definitions for the `/admin` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{admin, review, water_body};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `Admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /surveys                    -> list_surveys
/// GET    /surveys/pending            -> list_pending
/// GET    /surveys/{id}               -> get_survey
/// PATCH  /surveys/{id}/verify        -> verify_survey
/// PATCH  /surveys/{id}/flag          -> flag_survey
/// GET    /surveyors                  -> list_surveyors
/// DELETE /surveyors/{id}             -> delete_surveyor
/// GET    /surveyors/{id}/surveys     -> list_surveyor_surveys
/// POST   /users                      -> create_user
/// GET    /stats                      -> stats
/// GET    /water-bodies/status        -> health_statuses
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/surveys", get(review::list_surveys))
        .route("/surveys/pending", get(review::list_pending))
        .route("/surveys/{id}", get(review::get_survey))
        .route("/surveys/{id}/verify", patch(review::verify_survey))
        .route("/surveys/{id}/flag", patch(review::flag_survey))
        .route("/surveyors", get(admin::list_surveyors))
        .route(
            "/surveyors/{id}",
            axum::routing::delete(admin::delete_surveyor),
        )
        .route("/surveyors/{id}/surveys", get(admin::list_surveyor_surveys))
        .route("/users", post(admin::create_user))
        .route("/stats", get(admin::stats))
        .route("/water-bodies/status", get(water_body::health_statuses))
}
