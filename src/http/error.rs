//! Mapping of service errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::CountdownError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// HTTP error wrapper around [`CountdownError`].
#[derive(Debug)]
pub struct ApiError(pub CountdownError);

impl From<CountdownError> for ApiError {
    fn from(value: CountdownError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CountdownError::Validation(_) => StatusCode::BAD_REQUEST,
            CountdownError::NotFound(_) => StatusCode::NOT_FOUND,
            CountdownError::Config(_) | CountdownError::Store(_) | CountdownError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

/// Standard handler result type.
pub type ApiResult<T> = Result<T, ApiError>;
