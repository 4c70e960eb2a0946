//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Use these in handlers to enforce authorization at the type level.

use aquasurvey_core::error::CoreError;
use aquasurvey_core::roles::{ROLE_ADMIN, ROLE_SURVEYOR};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `Admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `Surveyor` role. Rejects with 403 Forbidden otherwise.
///
/// Admins review surveys but do not submit them.
pub struct RequireSurveyor(pub AuthUser);

impl FromRequestParts<AppState> for RequireSurveyor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_SURVEYOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Surveyor role required".into(),
            )));
        }
        Ok(RequireSurveyor(user))
    }
}
