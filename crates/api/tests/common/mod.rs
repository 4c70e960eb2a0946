//! Shared harness for API integration tests.
//!
//! Builds the real router around a test database pool and a stub forecast
//! gateway, and provides request helpers that drive it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use aquasurvey_api::app::build_router;
use aquasurvey_api::auth::jwt::{generate_access_token, JwtConfig};
use aquasurvey_api::auth::password::hash_password;
use aquasurvey_api::config::ServerConfig;
use aquasurvey_api::state::AppState;
use aquasurvey_core::forecast::{parse_forecast, Forecast, ForecastError, ForecastRequest};
use aquasurvey_core::health::HealthScope;
use aquasurvey_db::models::user::{CreateUser, User};
use aquasurvey_db::repositories::UserRepo;
use aquasurvey_forecast::{ForecastConfig, ForecastGateway};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "clear-water-123";

/// Location names that make [`StubGateway`] fail.
pub const OFFLINE_LOCATION: &str = "Offline Lake";
pub const GARBLED_LOCATION: &str = "Garbled Lake";

/// A well-formed reply wrapped in a markdown fence, as the real service
/// tends to send it.
pub const FENCED_FORECAST: &str = r#"```json
{
  "predicted_ph": 7.2,
  "predicted_turbidity": 3.1,
  "predicted_temperature": 24.5,
  "predicted_dissolvedOxygen": 7.8,
  "risk_level": "low",
  "trend_summary": "Stable conditions expected.",
  "7_day_forecast": [
    { "day": 1, "ph": 7.2, "turbidity": 3.1, "temperature": 24.5, "dissolvedOxygen": 7.8 },
    { "day": 2, "ph": 7.2, "turbidity": 3.2, "temperature": 24.6, "dissolvedOxygen": 7.7 },
    { "day": 3, "ph": 7.3, "turbidity": 3.2, "temperature": 24.6, "dissolvedOxygen": 7.7 },
    { "day": 4, "ph": 7.3, "turbidity": 3.3, "temperature": 24.7, "dissolvedOxygen": 7.6 },
    { "day": 5, "ph": 7.3, "turbidity": 3.3, "temperature": 24.8, "dissolvedOxygen": 7.6 },
    { "day": 6, "ph": 7.4, "turbidity": 3.4, "temperature": 24.8, "dissolvedOxygen": 7.5 },
    { "day": 7, "ph": 7.4, "turbidity": 3.4, "temperature": 24.9, "dissolvedOxygen": 7.5 }
  ]
}
```"#;

/// Forecast gateway that answers from canned replies instead of the network.
pub struct StubGateway;

#[async_trait]
impl ForecastGateway for StubGateway {
    async fn predict(&self, request: &ForecastRequest) -> Result<Forecast, ForecastError> {
        match request.location.trim() {
            OFFLINE_LOCATION => Err(ForecastError::UpstreamUnavailable(
                "connection refused".into(),
            )),
            GARBLED_LOCATION => parse_forecast("Sorry, I cannot help with that."),
            _ => parse_forecast(FENCED_FORECAST),
        }
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt_config(),
        health_scope: HealthScope::AllSurveys,
        forecast: ForecastConfig::default(),
    }
}

/// Build the full application router around `pool` and the stub gateway.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Same as [`build_test_app`] with an explicit configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_router(AppState {
        pool,
        config: Arc::new(config),
        forecast: Arc::new(StubGateway),
    })
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and return it with a valid token.
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> (User, String) {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{}@test.com", name.to_lowercase()),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    let token = generate_access_token(user.id, &user.role, &test_jwt_config())
        .expect("token generation should succeed");
    (user, token)
}

/// JSON body for a survey submission at `location`.
pub fn survey_body(location: &str, ph: f64) -> serde_json::Value {
    serde_json::json!({
        "location": { "name": location, "latitude": 25.3, "longitude": 83.0 },
        "measurements": { "ph": ph, "turbidity": 3.0, "temperature": 24.0, "dissolvedOxygen": 7.0 },
        "surveyorTime": "2025-01-01T08:00:00Z",
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request(Method::PATCH, uri, body, Some(token))).await
}

/// PATCH without a body, for decisions that take all defaults.
pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::PATCH, uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}
