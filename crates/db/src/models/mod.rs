//! Row models and DTOs.

pub mod survey;
pub mod user;
