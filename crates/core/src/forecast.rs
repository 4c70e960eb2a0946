//! Forecast request/response contract.
//!
//! Builds the prompt sent to the generative-text service and turns its text
//! reply into a validated [`Forecast`]. The HTTP call itself lives in the
//! `aquasurvey-forecast` crate.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::location::MAX_LOCATION_NAME_LENGTH;
use crate::measurement::Measurements;

/// Number of daily entries a forecast must contain.
pub const FORECAST_DAYS: usize = 7;

/// Matches a reply wrapped in a markdown code fence, optionally tagged `json`.
static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// The completion endpoint could not be reached or answered with an
    /// error status.
    #[error("Forecast service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The reply was not valid JSON of the expected shape.
    #[error("Malformed forecast: {0}")]
    MalformedForecast(String),
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Input to a forecast: the location, its past readings (oldest first) and
/// an optional current reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub location: String,
    #[serde(default)]
    pub history: Vec<Measurements>,
    #[serde(default)]
    pub current: Option<Measurements>,
}

impl ForecastRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(CoreError::Validation("location is required".into()));
        }
        if location.chars().count() > MAX_LOCATION_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "location must be at most {MAX_LOCATION_NAME_LENGTH} characters"
            )));
        }
        for snapshot in self.history.iter().chain(self.current.iter()) {
            snapshot.ensure_finite()?;
        }
        Ok(())
    }

    /// Render the natural-language prompt for the completion endpoint.
    pub fn prompt(&self) -> String {
        let history = serde_json::to_string(&self.history).unwrap_or_else(|_| "[]".into());
        let current = match &self.current {
            Some(current) => serde_json::to_string(current).unwrap_or_else(|_| "null".into()),
            None => "not provided".to_string(),
        };

        format!(
            "You are an expert in water quality forecasting.\n\
             Location: {location}\n\
             Historical readings, oldest first (pH, turbidity in NTU, temperature in C, \
             dissolved oxygen in mg/L):\n\
             {history}\n\
             Current reading:\n\
             {current}\n\
             Using the trend in these readings, predict the next values. If the current reading \
             is not provided, base the forecast on the history alone.\n\
             Reply with ONLY strict JSON of this shape and nothing else:\n\
             {{\n  \"predicted_ph\": number,\n  \"predicted_turbidity\": number,\n  \
             \"predicted_temperature\": number,\n  \"predicted_dissolvedOxygen\": number,\n  \
             \"risk_level\": \"low\" | \"moderate\" | \"high\",\n  \"trend_summary\": string,\n  \
             \"7_day_forecast\": [\n    {{ \"day\": number, \"ph\": number, \"turbidity\": number, \
             \"temperature\": number, \"dissolvedOxygen\": number }}\n  ]\n}}\n\
             The 7_day_forecast array must have exactly {FORECAST_DAYS} entries \
             for days 1 to {FORECAST_DAYS}.",
            location = self.location.trim(),
        )
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: u32,
    pub ph: f64,
    pub turbidity: f64,
    pub temperature: f64,
    #[serde(rename = "dissolvedOxygen")]
    pub dissolved_oxygen: f64,
}

/// Validated forecast. Field names on the wire follow the reply contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predicted_ph: f64,
    pub predicted_turbidity: f64,
    pub predicted_temperature: f64,
    #[serde(rename = "predicted_dissolvedOxygen")]
    pub predicted_dissolved_oxygen: f64,
    pub risk_level: RiskLevel,
    pub trend_summary: String,
    #[serde(rename = "7_day_forecast")]
    pub seven_day_forecast: Vec<ForecastDay>,
}

impl Forecast {
    fn check_shape(&self) -> Result<(), ForecastError> {
        let predicted = [
            self.predicted_ph,
            self.predicted_turbidity,
            self.predicted_temperature,
            self.predicted_dissolved_oxygen,
        ];
        if predicted.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MalformedForecast(
                "predicted values must be finite numbers".into(),
            ));
        }

        if self.seven_day_forecast.len() != FORECAST_DAYS {
            return Err(ForecastError::MalformedForecast(format!(
                "expected {FORECAST_DAYS} forecast days, got {}",
                self.seven_day_forecast.len()
            )));
        }

        for (index, day) in self.seven_day_forecast.iter().enumerate() {
            let expected = index as u32 + 1;
            if day.day != expected {
                return Err(ForecastError::MalformedForecast(format!(
                    "forecast entry {index} has day {}, expected {expected}",
                    day.day
                )));
            }
            let values = [day.ph, day.turbidity, day.temperature, day.dissolved_oxygen];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ForecastError::MalformedForecast(format!(
                    "forecast day {expected} has a non-finite value"
                )));
            }
        }
        Ok(())
    }
}

/// Remove a surrounding markdown code fence, if any, and trim.
pub fn strip_code_fences(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Parse the service's text reply into a validated [`Forecast`].
///
/// Never returns a partial object: any JSON or shape problem is a
/// [`ForecastError::MalformedForecast`].
pub fn parse_forecast(text: &str) -> Result<Forecast, ForecastError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ForecastError::MalformedForecast("empty response text".into()));
    }
    let forecast: Forecast = serde_json::from_str(body)
        .map_err(|e| ForecastError::MalformedForecast(e.to_string()))?;
    forecast.check_shape()?;
    Ok(forecast)
}
