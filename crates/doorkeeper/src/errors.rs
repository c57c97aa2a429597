use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DkError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown server")]
    UnknownServer,

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Messaging gateway error: {0}")]
    Adapter(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for DkError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            DkError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An internal database error occurred".to_string(),
            ),
            DkError::UnknownServer => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_SERVER",
                "No server is registered under this id".to_string(),
            ),
            DkError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "No account link matches this name".to_string(),
            ),
            DkError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            DkError::Adapter(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GATEWAY_ERROR",
                "The messaging gateway rejected the request".to_string(),
            ),
            DkError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
