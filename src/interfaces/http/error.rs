use crate::error::RelayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error returned by HTTP handlers.
///
/// | Error | HTTP Status |
/// |-------|-------------|
/// | `DecodeError` | 400 |
/// | `SignatureError` | 401 |
/// | anything else | 500 |
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RelayError::DecodeError(_) => StatusCode::BAD_REQUEST,
            RelayError::SignatureError(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(error: RelayError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}
