//! Route definitions for the public `/water-bodies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::water_body;
use crate::state::AppState;

/// Routes mounted at `/water-bodies`.
///
/// ```text
/// GET    /               -> list_summaries
/// GET    /search?q=      -> search
/// GET    /{name}         -> get_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(water_body::list_summaries))
        .route("/search", get(water_body::search))
        .route("/{name}", get(water_body::get_summary))
}
