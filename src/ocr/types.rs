//! OCR Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OCR provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProviderKind {
    /// Tesseract CLI (local)
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
    /// Remote OpenAI-compatible vision API
    OpenAi,
}

impl fmt::Display for OcrProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tesseract => "tesseract",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        };
        f.write_str(name)
    }
}

impl FromStr for OcrProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("unknown OCR provider: {other}")),
        }
    }
}

/// Extracted text plus the provider that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct OcrOutcome {
    pub text: String,
    pub provider: OcrProviderKind,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingFailed(String),

    #[error("OCR API error: {0}")]
    ApiError(String),
}

impl OcrError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
