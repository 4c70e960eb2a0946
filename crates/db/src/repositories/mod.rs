//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod survey_repo;
pub mod user_repo;

pub use survey_repo::SurveyRepo;
pub use user_repo::UserRepo;
