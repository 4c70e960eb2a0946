pub mod admin;
pub mod auth;
pub mod forecast;
pub mod public;
pub mod review;
pub mod survey;
pub mod water_body;
