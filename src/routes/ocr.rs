//! OCR route
//!
//! `POST /ocr` accepts either a JSON body `{ "url": "https://..." }` or a
//! multipart form carrying the image bytes under the `image` field. When a
//! request carries both an uploaded file and a URL, the uploaded file wins.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::acquire::{acquire, ImageSource};
use crate::error::{ApiError, Result};
use crate::ocr::OcrProviderKind;
use crate::state::AppState;

/// JSON request body
#[derive(Debug, Default, Deserialize)]
struct OcrJsonBody {
    url: Option<String>,
    language: Option<String>,
    provider: Option<OcrProviderKind>,
}

/// What the request carried, regardless of transport shape.
#[derive(Debug, Default)]
pub struct OcrSubmission {
    url: Option<String>,
    upload: Option<(Bytes, Option<String>)>,
    language: Option<String>,
    provider: Option<OcrProviderKind>,
}

#[async_trait]
impl<S> FromRequest<S> for OcrSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            Self::from_multipart(req, state).await
        } else {
            Self::from_json(req, state).await
        }
    }
}

impl OcrSubmission {
    async fn from_json<S: Send + Sync>(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        // An empty body is handled as MissingSource further down, matching
        // the no-fields case of a multipart request.
        if bytes.is_empty() {
            return Ok(Self::default());
        }

        let body: OcrJsonBody = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;

        Ok(Self {
            url: body.url,
            upload: None,
            language: body.language,
            provider: body.provider,
        })
    }

    async fn from_multipart<S: Send + Sync>(req: Request, state: &S) -> Result<Self> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let mut submission = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("image") => {
                    let declared_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| {
                        ApiError::BadRequest(format!("failed to read 'image' field: {e}"))
                    })?;
                    submission.upload = Some((bytes, declared_name));
                }
                Some("url") => {
                    submission.url = Some(read_text_field(field).await?);
                }
                Some("language") => {
                    submission.language = Some(read_text_field(field).await?);
                }
                Some("provider") => {
                    let raw = read_text_field(field).await?;
                    submission.provider =
                        Some(raw.parse::<OcrProviderKind>().map_err(ApiError::BadRequest)?);
                }
                _ => {}
            }
        }

        Ok(submission)
    }
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart field: {e}")))
}

/// Success response body
#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub ok: bool,
    pub text: String,
    pub provider: OcrProviderKind,
    pub length: usize,
    pub ts: DateTime<Utc>,
}

/// POST /ocr
pub async fn run_ocr(
    State(state): State<AppState>,
    submission: OcrSubmission,
) -> Result<Json<OcrResponse>> {
    let source = ImageSource::from_parts(submission.upload, submission.url)?;

    let image = acquire(
        state.http(),
        source,
        state.config().acquire.download_timeout,
    )
    .await?;

    tracing::debug!(
        mime = image.mime_type,
        size = image.bytes.len(),
        "image acquired"
    );

    let outcome = state
        .ocr()
        .recognize(&image, submission.provider, submission.language.as_deref())
        .await?;

    Ok(Json(OcrResponse {
        ok: true,
        length: outcome.text.chars().count(),
        text: outcome.text,
        provider: outcome.provider,
        ts: Utc::now(),
    }))
}
