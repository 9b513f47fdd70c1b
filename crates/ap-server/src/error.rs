//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`ap_core::Error`] through a wrapper so
//! route handlers can return `Result<T, AppError>`. Engine failures are
//! logged with their full diagnostics (captured stderr) and surfaced to
//! clients as a generic "conversion failed" body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError(ap_core::Error);

impl From<ap_core::Error> for AppError {
    fn from(e: ap_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self.0 {
            // Stderr and exit details stay server-side.
            ap_core::Error::Engine { message } => {
                tracing::error!("conversion failed: {message}");
                "conversion failed".to_string()
            }
            ap_core::Error::Validation(message) => message.clone(),
            other => {
                tracing::error!(status = %status, error = %other, "request failed");
                "internal error".to_string()
            }
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_produces_400() {
        let response = AppError::from(ap_core::Error::validation("unsupported format: ogg"))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_failure_produces_400() {
        let response =
            AppError::from(ap_core::Error::engine("exited with 1: demuxer choked")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_produces_500() {
        let response =
            AppError::from(ap_core::Error::Internal("listener gone".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
