//! Domain logic for the water-quality survey platform.
//!
//! Everything here is pure: no database, no HTTP. Storage and transport
//! crates feed data in and persist what comes out.

pub mod aggregation;
pub mod error;
pub mod forecast;
pub mod health;
pub mod location;
pub mod measurement;
pub mod reading;
pub mod review;
pub mod roles;
pub mod types;
