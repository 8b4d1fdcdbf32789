use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A filter, sort, or pagination parameter outside its allowed domain.
///
/// Carries the name of the offending query parameter so the HTTP layer can
/// point the caller at it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for '{field}': {message}")]
pub struct InvalidFilterError {
    pub field: &'static str,
    pub message: String,
}

impl InvalidFilterError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failure of a query-engine operation.
///
/// Store errors are carried as-is in [`QueryError::Persistence`]; the engine
/// never rewrites them.
#[derive(Debug, thiserror::Error)]
pub enum QueryError<E> {
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilterError),

    #[error("Persistence error: {0}")]
    Persistence(#[source] E),
}
