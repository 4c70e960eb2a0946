use std::sync::Arc;

use aquasurvey_forecast::ForecastGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: aquasurvey_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Completion service used by `/forecast`.
    pub forecast: Arc<dyn ForecastGateway>,
}
