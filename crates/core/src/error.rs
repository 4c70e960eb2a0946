use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} named '{name}'")]
    NotFoundNamed { entity: &'static str, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A numeric field reached the measurement validator without being a
    /// finite number.
    #[error("Type mismatch: {field} must be a finite number")]
    TypeMismatch { field: &'static str },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
