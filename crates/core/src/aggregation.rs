//! Per-location aggregation of verified surveys.
//!
//! Surveys are grouped by exact location name (no canonicalization). Each
//! group yields the survey count and the mean of every measurement, rounded
//! to two decimals. Coordinates come from the first member seen; callers
//! pass surveys newest first, so that is the most recent contributor.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::location::{match_names, NameMatch};
use crate::reading::SurveyReading;

/// Derived summary of all verified surveys at one location name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterBodySummary {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub avg_ph: f64,
    pub avg_turbidity: f64,
    pub avg_temperature: f64,
    pub avg_dissolved_oxygen: f64,
    pub total_surveys: i64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug)]
struct Accumulator {
    latitude: f64,
    longitude: f64,
    ph: f64,
    turbidity: f64,
    temperature: f64,
    dissolved_oxygen: f64,
    count: i64,
}

impl Accumulator {
    fn seeded<T: SurveyReading>(survey: &T) -> Self {
        let (latitude, longitude) = survey.coordinates();
        Self {
            latitude,
            longitude,
            ph: 0.0,
            turbidity: 0.0,
            temperature: 0.0,
            dissolved_oxygen: 0.0,
            count: 0,
        }
    }

    fn add<T: SurveyReading>(&mut self, survey: &T) {
        let m = survey.measurements();
        self.ph += m.ph;
        self.turbidity += m.turbidity;
        self.temperature += m.temperature;
        self.dissolved_oxygen += m.dissolved_oxygen;
        self.count += 1;
    }

    fn finish(self, name: String) -> WaterBodySummary {
        let n = self.count as f64;
        WaterBodySummary {
            name,
            latitude: self.latitude,
            longitude: self.longitude,
            avg_ph: round2(self.ph / n),
            avg_turbidity: round2(self.turbidity / n),
            avg_temperature: round2(self.temperature / n),
            avg_dissolved_oxygen: round2(self.dissolved_oxygen / n),
            total_surveys: self.count,
        }
    }
}

/// Summarize every location that has at least one verified survey.
///
/// Non-verified surveys are ignored. Output order follows the first
/// appearance of each location in `surveys`.
pub fn summarize_verified<T: SurveyReading>(surveys: &[T]) -> Vec<WaterBodySummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();

    for survey in surveys.iter().filter(|s| s.is_verified()) {
        let name = survey.location_name();
        let acc = groups.entry(name).or_insert_with(|| {
            order.push(name);
            Accumulator::seeded(survey)
        });
        acc.add(survey);
    }

    order
        .into_iter()
        .filter_map(|name| groups.remove(name).map(|acc| acc.finish(name.to_string())))
        .collect()
}

/// Summarize one location and return its contributing surveys.
///
/// Fails with [`CoreError::NotFoundNamed`] when no verified survey carries
/// exactly `name`.
pub fn summarize_location<'a, T: SurveyReading>(
    surveys: &'a [T],
    name: &str,
) -> Result<(WaterBodySummary, Vec<&'a T>), CoreError> {
    let members: Vec<&T> = surveys
        .iter()
        .filter(|s| s.is_verified() && s.location_name() == name)
        .collect();

    let Some(first) = members.first() else {
        return Err(CoreError::NotFoundNamed {
            entity: "WaterBody",
            name: name.to_string(),
        });
    };

    let mut acc = Accumulator::seeded(*first);
    for survey in &members {
        acc.add(*survey);
    }

    Ok((acc.finish(name.to_string()), members))
}

/// Find the summary whose name best matches a free-text query.
///
/// An exact search-key match beats a partial one; among equals the earliest
/// summary wins.
pub fn best_match<'a>(
    summaries: &'a [WaterBodySummary],
    query: &str,
) -> Option<&'a WaterBodySummary> {
    let mut best: Option<(NameMatch, &WaterBodySummary)> = None;
    for summary in summaries {
        if let Some(quality) = match_names(&summary.name, query) {
            if best.map_or(true, |(current, _)| quality > current) {
                best = Some((quality, summary));
            }
        }
    }
    best.map(|(_, summary)| summary)
}
