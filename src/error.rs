//! Error types for Leitor Server
//!
//! Every failure a request can hit is converted here into a JSON body plus
//! an HTTP status; nothing propagates past the handler boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::acquire::AcquireError;
use crate::ocr::OcrError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Application error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
    code: &'static str,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Acquire(e) => e.status_code(),
            Self::Ocr(e) => e.status_code(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Acquire(AcquireError::MissingSource) => "MISSING_SOURCE",
            Self::Acquire(AcquireError::DownloadFailed { .. }) => "DOWNLOAD_FAILED",
            Self::Acquire(AcquireError::DownloadTimeout) => "DOWNLOAD_TIMEOUT",
            Self::Acquire(AcquireError::Unreachable(_)) => "UPSTREAM_UNREACHABLE",
            Self::Acquire(AcquireError::UnsupportedType { .. }) => "UNSUPPORTED_TYPE",
            Self::Ocr(OcrError::ProviderUnavailable(_)) => "PROVIDER_UNAVAILABLE",
            Self::Ocr(_) => "OCR_FAILED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let body = Json(ErrorResponse {
            ok: false,
            error: self.to_string(),
            code: self.code(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_faults_map_to_4xx() {
        assert_eq!(
            ApiError::from(AcquireError::MissingSource).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AcquireError::UnsupportedType {
                detected: "image/gif".to_string()
            })
            .status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn upstream_faults_map_to_5xx() {
        assert_eq!(
            ApiError::from(AcquireError::DownloadFailed { status: 404 }).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(AcquireError::DownloadTimeout).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(OcrError::ProcessingFailed("x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(OcrError::ProviderUnavailable("x".to_string())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
