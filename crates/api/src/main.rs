use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aquasurvey_api::app::build_router;
use aquasurvey_api::config::ServerConfig;
use aquasurvey_api::state::AppState;
use aquasurvey_forecast::GeminiGateway;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "aquasurvey_api=debug,aquasurvey_forecast=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        health_scope = ?config.health_scope,
        forecast_model = %config.forecast.model,
        "Loaded server configuration"
    );
    if config.forecast.api_key.is_none() {
        tracing::warn!("FORECAST_API_KEY is not set; forecasts will report the service as down");
    }

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = aquasurvey_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    aquasurvey_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    aquasurvey_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let forecast =
        GeminiGateway::new(config.forecast.clone()).expect("Failed to build forecast HTTP client");

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );

    let app = build_router(AppState {
        pool,
        config: Arc::new(config),
        forecast: Arc::new(forecast),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
