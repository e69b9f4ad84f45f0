//! Maps domain `AppError` to HTTP responses.
//!
//! The three terminal link states map to `410 Gone` with distinct machine
//! codes, so clients can tell a dead link from a link that never existed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use docvault_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Response-side wrapper for [`AppError`].
///
/// Handlers return `Result<_, ApiError>`; the `?` operator converts
/// domain errors through the `From` impl.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err.kind {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Expired | ErrorKind::Revoked | ErrorKind::Exhausted => StatusCode::GONE,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::TransientStore => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal | ErrorKind::Configuration | ErrorKind::Serialization => {
                tracing::error!(error = %err.message, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_terminal_link_states_map_to_gone() {
        assert_eq!(status_of(AppError::expired("e")), StatusCode::GONE);
        assert_eq!(status_of(AppError::revoked("r")), StatusCode::GONE);
        assert_eq!(status_of(AppError::exhausted("x")), StatusCode::GONE);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::invalid_input("i")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::not_found("n")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::conflict("c")), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AppError::transient_store("t")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
