use thiserror::Error;

use crate::validation::Violation;

/// Application-wide error types for the notes service.
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more request fields broke a validation rule.
    #[error("Validation failed: {}", format_violations(.0))]
    Validation(Vec<Violation>),

    /// The caller tried to alter a note owned by someone else.
    #[error("User [{requester}] is not the owner of note [{note_id}] (owner: [{owner}])")]
    NotOwner {
        note_id: String,
        owner: String,
        requester: String,
    },

    /// The supplied version does not match the stored one.
    #[error("Can't update note [{note_id}] with version [{version}]")]
    IncorrectVersion {
        note_id: String,
        username: String,
        version: i64,
    },

    /// The request body is not valid JSON for the endpoint.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// The request body was not sent as `application/json`.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Build a validation error holding a single violation.
    pub fn violation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![Violation::new(field, message)])
    }

    /// Returns true if the error was caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::DatabaseError(_) | AppError::ConfigError(_) | AppError::Generic(_)
        )
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}
