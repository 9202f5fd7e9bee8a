//! Magic-number content sniffing
//!
//! The declared filename or Content-Type of a request is never trusted; the
//! true format is detected from the leading bytes of the buffer.

use image::ImageFormat;

use super::types::AcquireError;

/// Formats the OCR backends accept.
const ALLOWED: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Detect the MIME type from byte content, restricted to the allow-list.
///
/// Recognizable formats outside the allow-list (gif, bmp, ...) are reported
/// with their detected MIME; unrecognizable bytes report `"unknown"`.
pub fn sniff_mime(bytes: &[u8]) -> Result<&'static str, AcquireError> {
    let format = image::guess_format(bytes).map_err(|_| AcquireError::UnsupportedType {
        detected: "unknown".to_string(),
    })?;

    if ALLOWED.contains(&format) {
        Ok(format.to_mime_type())
    } else {
        Err(AcquireError::UnsupportedType {
            detected: format.to_mime_type().to_string(),
        })
    }
}
