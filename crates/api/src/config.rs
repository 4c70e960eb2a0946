use std::time::Duration;

use aquasurvey_core::health::HealthScope;
use aquasurvey_forecast::{ForecastConfig, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Which surveys the health scorer looks at (default: all).
    pub health_scope: HealthScope,
    /// Completion service settings for `/forecast`.
    pub forecast: ForecastConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                              |
    /// |-------------------------|------------------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                            |
    /// | `PORT`                  | `3000`                                               |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`                              |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                                 |
    /// | `HEALTH_SCORE_SCOPE`    | `all`                                                |
    /// | `FORECAST_API_URL`      | `https://generativelanguage.googleapis.com/v1/models` |
    /// | `FORECAST_MODEL`        | `gemini-2.5-flash`                                   |
    /// | `FORECAST_API_KEY`      | unset                                                |
    /// | `FORECAST_TIMEOUT_SECS` | `30`                                                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let health_scope = std::env::var("HEALTH_SCORE_SCOPE")
            .map(|v| HealthScope::parse(&v).unwrap_or_else(|e| panic!("{e}")))
            .unwrap_or_default();

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            health_scope,
            forecast: forecast_config_from_env(),
        }
    }
}

fn forecast_config_from_env() -> ForecastConfig {
    let api_url = std::env::var("FORECAST_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
    let model = std::env::var("FORECAST_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
    let api_key = std::env::var("FORECAST_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    let timeout_secs: u64 = std::env::var("FORECAST_TIMEOUT_SECS")
        .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
        .parse()
        .expect("FORECAST_TIMEOUT_SECS must be a valid u64");

    ForecastConfig {
        api_url,
        model,
        api_key,
        timeout: Duration::from_secs(timeout_secs),
    }
}
