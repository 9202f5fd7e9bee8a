//! Acquisition types
//!
//! Input/output types for the acquisition pipeline and the error taxonomy
//! reported back to the HTTP layer.

use axum::body::Bytes;

/// Where the image bytes come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Download from a remote URL.
    RemoteUrl(String),
    /// Bytes already carried in the request body.
    Upload {
        bytes: Bytes,
        /// Filename declared by the client. Informational only, never
        /// consulted for type detection.
        declared_name: Option<String>,
    },
}

impl ImageSource {
    /// Build a source from whatever the request carried.
    ///
    /// An uploaded file takes precedence over a URL when both are present.
    pub fn from_parts(
        upload: Option<(Bytes, Option<String>)>,
        url: Option<String>,
    ) -> Result<Self, AcquireError> {
        if let Some((bytes, declared_name)) = upload {
            Ok(Self::Upload {
                bytes,
                declared_name,
            })
        } else if let Some(url) = url {
            Ok(Self::RemoteUrl(url))
        } else {
            Err(AcquireError::MissingSource)
        }
    }
}

/// A validated image ready to hand to a text-extraction backend.
///
/// `mime_type` is always derived from the byte content itself and is one of
/// `image/png`, `image/jpeg` or `image/webp`.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    pub bytes: Bytes,
    pub mime_type: &'static str,
}

/// Acquisition error types
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("send a \"url\" in the JSON body or a file upload in the 'image' form field")]
    MissingSource,

    #[error("failed to download image ({status})")]
    DownloadFailed { status: u16 },

    #[error("timed out downloading image")]
    DownloadTimeout,

    #[error("could not reach image host: {0}")]
    Unreachable(String),

    #[error("unsupported file type: {detected}")]
    UnsupportedType { detected: String },
}

impl AcquireError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::MissingSource => StatusCode::BAD_REQUEST,
            Self::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::DownloadFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::DownloadTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
