use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// Rejected before reaching the store: bad clock-event kind, unparseable number, missing field.
    Validation(String),
    /// Opaque message from the record store.
    DatabaseError(String),
    /// A second submission while the form still has one in flight.
    SubmissionInFlight,
    /// One or more of the initial page fetches failed.
    LoadFailed(Vec<String>),
    InternalServerError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct LoadFailedResponse<'a> {
    error: &'static str,
    details: &'a [String],
}

impl AppError {
    /// The bare message, without the category prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg)
            | AppError::DatabaseError(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::SubmissionInFlight => "A submission is already in progress".to_string(),
            AppError::LoadFailed(errors) => errors.join("; "),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::SubmissionInFlight => write!(f, "Conflict: {}", self.message()),
            AppError::LoadFailed(errors) => write!(f, "Load Failed: {}", errors.join("; ")),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::SubmissionInFlight => StatusCode::CONFLICT,
            AppError::LoadFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::LoadFailed(errors) => {
                HttpResponse::build(self.status_code()).json(LoadFailedResponse {
                    error: "Could not load data from the record store",
                    details: errors,
                })
            }
            other => HttpResponse::build(other.status_code()).json(ErrorResponse {
                error: other.message(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_category() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::SubmissionInFlight.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::LoadFailed(vec!["a".into()]).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::DatabaseError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_strips_the_display_prefix() {
        let err = AppError::DatabaseError("duplicate key".into());
        assert_eq!(err.message(), "duplicate key");
        assert_eq!(err.to_string(), "Database Error: duplicate key");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
    }
}
