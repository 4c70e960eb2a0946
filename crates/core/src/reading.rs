//! Read-only view of a persisted survey used by the scoring and aggregation
//! passes. The `db` crate implements it for its row type so the pure logic
//! here never depends on the storage layer.

use crate::measurement::Measurements;
use crate::types::{DbId, Timestamp};

pub trait SurveyReading {
    fn survey_id(&self) -> DbId;
    fn location_name(&self) -> &str;
    /// `(latitude, longitude)`.
    fn coordinates(&self) -> (f64, f64);
    fn measurements(&self) -> Measurements;
    fn received_at(&self) -> Timestamp;
    fn is_verified(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    /// Minimal in-memory reading for unit tests.
    #[derive(Debug, Clone)]
    pub struct Sample {
        pub id: DbId,
        pub name: String,
        pub lat: f64,
        pub lon: f64,
        pub m: Measurements,
        pub at: Timestamp,
        pub verified: bool,
    }

    impl Sample {
        /// A verified sample received `minutes` after a fixed epoch.
        pub fn new(id: DbId, name: &str, ph: f64, minutes: i64) -> Self {
            Self {
                id,
                name: name.to_string(),
                lat: 25.3,
                lon: 83.0,
                m: Measurements {
                    ph,
                    turbidity: 3.0,
                    temperature: 24.0,
                    dissolved_oxygen: 7.0,
                },
                at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
                verified: true,
            }
        }

        pub fn pending(mut self) -> Self {
            self.verified = false;
            self
        }

        pub fn with_measurements(mut self, m: Measurements) -> Self {
            self.m = m;
            self
        }

        pub fn at_coordinates(mut self, lat: f64, lon: f64) -> Self {
            self.lat = lat;
            self.lon = lon;
            self
        }
    }

    impl SurveyReading for Sample {
        fn survey_id(&self) -> DbId {
            self.id
        }
        fn location_name(&self) -> &str {
            &self.name
        }
        fn coordinates(&self) -> (f64, f64) {
            (self.lat, self.lon)
        }
        fn measurements(&self) -> Measurements {
            self.m
        }
        fn received_at(&self) -> Timestamp {
            self.at
        }
        fn is_verified(&self) -> bool {
            self.verified
        }
    }
}
