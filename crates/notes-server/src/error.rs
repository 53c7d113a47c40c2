use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use notes_core::error::AppError;
use notes_core::validation::Violation;

use crate::dto::ErrorMessage;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self(AppError::UnsupportedMediaType(rejection.body_text()))
            }
            _ => Self(AppError::MalformedBody(rejection.body_text())),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::violation("query", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, violations) = match self.0 {
            AppError::Validation(violations) => {
                let status = StatusCode::BAD_REQUEST;
                tracing::info!("Handling validation error [{status}]");
                tracing::debug!("Violations: {violations:?}");
                (status, violations)
            }
            AppError::NotOwner {
                note_id,
                owner,
                requester,
            } => {
                tracing::warn!(
                    "[{requester}] tried to alter note [{note_id}] that belongs to [{owner}]"
                );
                (
                    StatusCode::FORBIDDEN,
                    vec![Violation::new(
                        "id",
                        format!("note [{note_id}] does not belong to you"),
                    )],
                )
            }
            AppError::IncorrectVersion {
                note_id,
                username,
                version,
            } => {
                tracing::warn!(
                    "User [{username}] failed to update note [{note_id}] using version [{version}]"
                );
                (
                    StatusCode::CONFLICT,
                    vec![Violation::new("version", format!("incorrect value: {version}"))],
                )
            }
            AppError::MalformedBody(message) => {
                tracing::info!("Rejecting malformed body: {message}");
                (StatusCode::BAD_REQUEST, vec![Violation::new("body", message)])
            }
            AppError::UnsupportedMediaType(message) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                vec![Violation::new("body", message)],
            ),
            other => {
                tracing::error!("Request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec![Violation::new("server", "internal server error")],
                )
            }
        };

        let body = ErrorMessage::new(status, violations);
        (status, axum::Json(body)).into_response()
    }
}
