use validator::ValidationErrors;

use crate::validation::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum UserActionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Invalid(String),
    #[error("Failed to {operation}")]
    Store {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl UserActionError {
    /// Wraps a store failure, logging it with the failed operation.
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| {
            tracing::error!(error = ?source, operation, "User action store operation failed");
            UserActionError::Store { operation, source }
        }
    }
}
