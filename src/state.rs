//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::OcrService;

/// Shared application state
///
/// The HTTP client and OCR service are built once at startup and shared by
/// every request; nothing in here is mutated per-request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    http: reqwest::Client,
    ocr: OcrService,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, http: reqwest::Client, ocr: OcrService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, http, ocr }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the shared HTTP client
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}
