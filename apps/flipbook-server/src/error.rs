//! Error types for the flipbook server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::viewer::ViewerError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Viewer error: {0}")]
    Viewer(#[from] ViewerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Viewer(e) => {
                let status = match e {
                    ViewerError::MissingUrl | ViewerError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                    ViewerError::Superseded => StatusCode::CONFLICT,
                    ViewerError::Index { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.kind(), e.user_message())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "IO error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::FetchError;

    #[test]
    fn test_viewer_error_status() {
        let cases = [
            (ViewerError::MissingUrl, StatusCode::BAD_REQUEST),
            (ViewerError::Superseded, StatusCode::CONFLICT),
            (
                ViewerError::Fetch(FetchError::Status(404)),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ViewerError::Auth, StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("index.html".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
