//! Survey location type, boundary validation, and the search key used to
//! match free-text queries against water-body names.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a location name.
pub const MAX_LOCATION_NAME_LENGTH: usize = 200;

/// Generic water-body words dropped when building a search key.
pub const GENERIC_WATER_WORDS: &[&str] = &[
    "river",
    "lake",
    "nadi",
    "talav",
    "talab",
    "jheel",
    "sarovar",
    "reservoir",
    "pond",
    "water",
    "waterbody",
    "dam",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn validate(&self) -> Result<(), CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Location name must not be empty".into()));
        }
        if name.chars().count() > MAX_LOCATION_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Location name must be at most {MAX_LOCATION_NAME_LENGTH} characters"
            )));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::Validation(format!(
                "latitude must be between -90 and 90, got {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::Validation(format!(
                "longitude must be between -180 and 180, got {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Build the comparison key for a water-body name.
///
/// Lower-cases, strips everything but ASCII letters, digits and whitespace,
/// drops [`GENERIC_WATER_WORDS`], sorts the remaining words and concatenates
/// them. `"Ganga River - Varanasi"` and `"varanasi ganga"` share a key.
pub fn search_key(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let mut words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !GENERIC_WATER_WORDS.contains(w))
        .collect();
    words.sort_unstable();
    words.concat()
}

/// How well a candidate name matches a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NameMatch {
    Partial,
    Exact,
}

/// Compare two names by search key. Returns `None` when neither key
/// contains the other, or when either key is empty.
pub fn match_names(candidate: &str, query: &str) -> Option<NameMatch> {
    let candidate = search_key(candidate);
    let query = search_key(query);
    if candidate.is_empty() || query.is_empty() {
        return None;
    }
    if candidate == query {
        Some(NameMatch::Exact)
    } else if candidate.contains(&query) || query.contains(&candidate) {
        Some(NameMatch::Partial)
    } else {
        None
    }
}
