//! Measurement readings and the automatic range checks run at survey creation.
//!
//! The checks are fixed per field and independent of each other. Their result
//! is persisted once as the survey's `auto_checks` and never recomputed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Inclusive pH bounds.
pub const PH_RANGE: (f64, f64) = (0.0, 14.0);

/// Inclusive temperature bounds in degrees Celsius.
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 60.0);

/// Inclusive dissolved oxygen bounds in mg/L.
pub const DISSOLVED_OXYGEN_RANGE: (f64, f64) = (0.0, 14.0);

/// Turbidity (NTU) has only a lower bound.
pub const TURBIDITY_MIN: f64 = 0.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One set of field readings taken at a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub ph: f64,
    pub turbidity: f64,
    pub temperature: f64,
    #[serde(alias = "dissolvedOxygen")]
    pub dissolved_oxygen: f64,
}

impl Measurements {
    /// Reject NaN and infinite readings, naming the first offending field.
    pub fn ensure_finite(&self) -> Result<(), CoreError> {
        let fields = [
            ("ph", self.ph),
            ("turbidity", self.turbidity),
            ("temperature", self.temperature),
            ("dissolved_oxygen", self.dissolved_oxygen),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::TypeMismatch { field });
            }
        }
        Ok(())
    }
}

/// Result of the automatic range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoChecks {
    pub ph_valid: bool,
    pub temperature_valid: bool,
    pub turbidity_valid: bool,
    pub dissolved_oxygen_valid: bool,
    /// Number of failed checks (0..=4).
    pub anomaly_score: i16,
}

impl AutoChecks {
    /// Build from the four flags, deriving `anomaly_score`.
    pub fn from_flags(
        ph_valid: bool,
        temperature_valid: bool,
        turbidity_valid: bool,
        dissolved_oxygen_valid: bool,
    ) -> Self {
        let anomaly_score = [ph_valid, temperature_valid, turbidity_valid, dissolved_oxygen_valid]
            .iter()
            .filter(|valid| !**valid)
            .count() as i16;
        Self {
            ph_valid,
            temperature_valid,
            turbidity_valid,
            dissolved_oxygen_valid,
            anomaly_score,
        }
    }

    /// Human-readable issue list, one entry per failed check.
    pub fn issues(&self) -> Vec<&'static str> {
        let mut issues = Vec::new();
        if !self.ph_valid {
            issues.push("Invalid pH range");
        }
        if !self.temperature_valid {
            issues.push("Temperature out of range");
        }
        if !self.turbidity_valid {
            issues.push("Turbidity cannot be negative");
        }
        if !self.dissolved_oxygen_valid {
            issues.push("DO value is not realistic");
        }
        issues
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn within(value: f64, (min, max): (f64, f64)) -> bool {
    (min..=max).contains(&value)
}

/// Run the automatic range checks against a set of readings.
///
/// Returns [`CoreError::TypeMismatch`] if any reading is not a finite
/// number. Out-of-range values are not errors; they lower the flags and
/// raise the anomaly score.
pub fn validate_measurements(m: &Measurements) -> Result<AutoChecks, CoreError> {
    m.ensure_finite()?;

    Ok(AutoChecks::from_flags(
        within(m.ph, PH_RANGE),
        within(m.temperature, TEMPERATURE_RANGE),
        m.turbidity >= TURBIDITY_MIN,
        within(m.dissolved_oxygen, DISSOLVED_OXYGEN_RANGE),
    ))
}
