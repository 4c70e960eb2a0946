//! Client for the generative-text completion service behind `/forecast`.
//!
//! [`ForecastGateway`] is the seam the API depends on; [`GeminiGateway`] is
//! the production implementation that talks to a `generateContent`
//! endpoint over HTTP using [`reqwest`].

use std::time::Duration;

use aquasurvey_core::forecast::{parse_forecast, Forecast, ForecastError, ForecastRequest};
use async_trait::async_trait;
use serde::Deserialize;

/// Default base URL of the completion API.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1/models";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection settings for the completion service.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Base URL, without a trailing slash.
    pub api_url: String,
    pub model: String,
    /// Credential. Requests fail with `UpstreamUnavailable` when absent.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// Produces a validated [`Forecast`] for a request.
#[async_trait]
pub trait ForecastGateway: Send + Sync {
    async fn predict(&self, request: &ForecastRequest) -> Result<Forecast, ForecastError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the first text part out of a `generateContent` reply.
fn extract_text(body: &str) -> Result<String, ForecastError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ForecastError::MalformedForecast(format!("unreadable reply envelope: {e}")))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| ForecastError::MalformedForecast("reply contained no text".into()))
}

// ---------------------------------------------------------------------------
// GeminiGateway
// ---------------------------------------------------------------------------

/// HTTP client for a `generateContent` completion endpoint.
pub struct GeminiGateway {
    client: reqwest::Client,
    config: ForecastConfig,
}

impl GeminiGateway {
    pub fn new(config: ForecastConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send the prompt and return the raw reply body.
    async fn complete(&self, prompt: &str) -> Result<String, ForecastError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ForecastError::UpstreamUnavailable("forecast API key is not configured".into())
        })?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ForecastError::UpstreamUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ForecastError::UpstreamUnavailable(format!("reading reply failed: {e}")))?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %text,
                "Forecast service returned an error"
            );
            return Err(ForecastError::UpstreamUnavailable(format!(
                "completion endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl ForecastGateway for GeminiGateway {
    async fn predict(&self, request: &ForecastRequest) -> Result<Forecast, ForecastError> {
        let body = self.complete(&request.prompt()).await?;
        let text = extract_text(&body)?;
        let forecast = parse_forecast(&text).inspect_err(|e| {
            tracing::warn!(
                error = %e,
                location = %request.location,
                "Discarding malformed forecast"
            );
        })?;

        tracing::info!(
            location = %request.location,
            risk_level = ?forecast.risk_level,
            "Forecast generated",
        );
        Ok(forecast)
    }
}
