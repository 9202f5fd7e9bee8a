//! OCR Module
//!
//! Text extraction from validated images.
//!
//! Supports multiple backends:
//! - Tesseract CLI (local, requires installation)
//! - Ollama vision models (local LLM)
//! - Remote OpenAI-compatible vision API (requires API key)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leitor_server::ocr::{OcrService, OcrProviderKind};
//!
//! let service = OcrService::new(config.ocr, client);
//!
//! // Check available providers
//! let providers = service.available_providers().await;
//!
//! // Extract text
//! let outcome = service.recognize(&image, None, Some("eng+por")).await?;
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, OllamaProvider, OpenAiProvider, TesseractProvider};
pub use service::OcrService;
pub use types::{OcrError, OcrOutcome, OcrProviderKind};
