//! Water-body health scoring.
//!
//! Each location is rated from its most recent survey. Four criteria add up
//! to a 0-4 score (half credit for near-miss bands), which maps onto a
//! qualitative status.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::measurement::Measurements;
use crate::reading::SurveyReading;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

const PH_FULL: (f64, f64) = (6.5, 8.5);
const PH_HALF: (f64, f64) = (6.2, 9.0);

const TURBIDITY_FULL_MAX: f64 = 5.0;
const TURBIDITY_HALF_MAX: f64 = 15.0;

const TEMPERATURE_FULL: (f64, f64) = (20.0, 28.0);
const TEMPERATURE_HALF: (f64, f64) = (15.0, 34.0);

const DISSOLVED_OXYGEN_FULL_MIN: f64 = 6.0;
const DISSOLVED_OXYGEN_HALF_MIN: f64 = 5.0;

/// Highest attainable score.
pub const MAX_SCORE: f64 = 4.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Qualitative rating derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Good,
    Moderate,
    Poor,
    Critical,
}

impl HealthStatus {
    /// Bucket a score; half points fall into the lower bucket.
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            Self::Good
        } else if score >= 3.0 {
            Self::Moderate
        } else if score >= 2.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::Critical => "Critical",
        }
    }
}

/// Which surveys are eligible to represent a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthScope {
    /// Latest survey regardless of review status.
    #[default]
    AllSurveys,
    /// Latest verified survey only.
    VerifiedOnly,
}

impl HealthScope {
    /// Parse the `HEALTH_SCORE_SCOPE` setting (`all` or `verified`).
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::AllSurveys),
            "verified" => Ok(Self::VerifiedOnly),
            other => Err(format!(
                "Invalid health score scope '{other}'. Must be one of: all, verified"
            )),
        }
    }
}

/// Score for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScoreResult {
    pub location: String,
    pub survey_id: DbId,
    pub score: f64,
    pub status: HealthStatus,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn banded(value: f64, full: (f64, f64), half: (f64, f64)) -> f64 {
    if (full.0..=full.1).contains(&value) {
        1.0
    } else if (half.0..=half.1).contains(&value) {
        0.5
    } else {
        0.0
    }
}

/// Compute the 0-4 health score for one set of readings.
pub fn score_measurements(m: &Measurements) -> f64 {
    let ph = banded(m.ph, PH_FULL, PH_HALF);

    let turbidity = if (0.0..=TURBIDITY_FULL_MAX).contains(&m.turbidity) {
        1.0
    } else if m.turbidity > TURBIDITY_FULL_MAX && m.turbidity <= TURBIDITY_HALF_MAX {
        0.5
    } else {
        0.0
    };

    let temperature = banded(m.temperature, TEMPERATURE_FULL, TEMPERATURE_HALF);

    let dissolved_oxygen = if m.dissolved_oxygen >= DISSOLVED_OXYGEN_FULL_MIN {
        1.0
    } else if m.dissolved_oxygen >= DISSOLVED_OXYGEN_HALF_MIN {
        0.5
    } else {
        0.0
    };

    ph + turbidity + temperature + dissolved_oxygen
}

/// Pick the most recent eligible survey per location name.
///
/// Ties on `received_at` keep whichever record appears first in `surveys`.
/// The output preserves the order in which each location's winner was first
/// seen.
pub fn latest_per_location<T: SurveyReading>(surveys: &[T], scope: HealthScope) -> Vec<&T> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &T> = HashMap::new();

    for survey in surveys {
        if scope == HealthScope::VerifiedOnly && !survey.is_verified() {
            continue;
        }
        let name = survey.location_name();
        let newer = match latest.get(name) {
            Some(current) => survey.received_at() > current.received_at(),
            None => {
                order.push(name);
                true
            }
        };
        if newer {
            latest.insert(name, survey);
        }
    }

    order.into_iter().filter_map(|name| latest.get(name).copied()).collect()
}

/// Score every location from its latest eligible survey.
pub fn score_locations<T: SurveyReading>(
    surveys: &[T],
    scope: HealthScope,
) -> Vec<HealthScoreResult> {
    latest_per_location(surveys, scope)
        .into_iter()
        .map(|survey| {
            let score = score_measurements(&survey.measurements());
            HealthScoreResult {
                location: survey.location_name().to_string(),
                survey_id: survey.survey_id(),
                score,
                status: HealthStatus::from_score(score),
            }
        })
        .collect()
}
