//! Image Acquisition & Validation Pipeline
//!
//! Turns an [`ImageSource`] (remote URL or uploaded bytes) into an
//! [`AcquiredImage`] whose MIME type has been verified from the actual byte
//! content, or fails with a classified [`AcquireError`].
//!
//! Downloads are bounded by a hard per-request timeout that also cancels the
//! in-flight transfer; the buffer stays in memory and never touches disk.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leitor_server::acquire::{acquire, ImageSource};
//!
//! let source = ImageSource::RemoteUrl("https://example.com/photo.jpg".into());
//! let image = acquire(&client, source, Duration::from_secs(25)).await?;
//! assert_eq!(image.mime_type, "image/jpeg");
//! ```

mod sniff;
mod types;

pub use sniff::sniff_mime;
pub use types::{AcquireError, AcquiredImage, ImageSource};

use std::time::Duration;

use axum::body::Bytes;

/// Default hard limit on a single image download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(25);

/// Acquire and validate an image from either source.
///
/// The upload path performs no network activity. Both paths end in
/// magic-number sniffing against the `{png, jpeg, webp}` allow-list.
pub async fn acquire(
    client: &reqwest::Client,
    source: ImageSource,
    timeout: Duration,
) -> Result<AcquiredImage, AcquireError> {
    let bytes = match source {
        ImageSource::RemoteUrl(url) => {
            tracing::debug!(%url, "downloading image");
            download(client, &url, timeout).await?
        }
        ImageSource::Upload {
            bytes,
            declared_name,
        } => {
            if let Some(name) = &declared_name {
                tracing::debug!(%name, size = bytes.len(), "using uploaded bytes");
            }
            bytes
        }
    };

    let mime_type = sniff::sniff_mime(&bytes)?;
    Ok(AcquiredImage { bytes, mime_type })
}

async fn download(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Bytes, AcquireError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify_request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AcquireError::DownloadFailed {
            status: status.as_u16(),
        });
    }

    // The per-request timeout covers the body read as well; dropping the
    // response on error aborts the in-flight transfer.
    response.bytes().await.map_err(classify_request_error)
}

fn classify_request_error(err: reqwest::Error) -> AcquireError {
    if err.is_timeout() {
        AcquireError::DownloadTimeout
    } else if let Some(status) = err.status() {
        AcquireError::DownloadFailed {
            status: status.as_u16(),
        }
    } else {
        AcquireError::Unreachable(err.to_string())
    }
}
