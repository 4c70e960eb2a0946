//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `Admin` role.
//! - [`rbac::RequireSurveyor`] -- Requires the `Surveyor` role.

pub mod auth;
pub mod rbac;
