//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`rc_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on core results.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub rc_core::Error);

impl From<rc_core::Error> for AppError {
    fn from(e: rc_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 416 carries the file size and no body.
        if let rc_core::Error::RangeNotSatisfiable { size } = &self.0 {
            return (
                StatusCode::RANGE_NOT_SATISFIABLE,
                [
                    (header::CONTENT_RANGE, format!("bytes */{size}")),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                (),
            )
                .into_response();
        }

        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.0,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_produces_404() {
        let response = AppError(rc_core::Error::not_found("video", "a.mkv")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn forbidden_produces_403() {
        let response = AppError(rc_core::Error::Forbidden("..".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn range_not_satisfiable_has_empty_body() {
        let response = AppError(rc_core::Error::RangeNotSatisfiable { size: 1000 }).into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1000");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn generation_failure_is_bad_gateway() {
        let response =
            AppError(rc_core::Error::generation("hls", "ffmpeg exited")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
