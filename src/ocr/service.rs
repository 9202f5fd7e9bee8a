//! OCR Service
//!
//! Orchestrates the configured providers: tries the one the caller asked
//! for, or falls back through the configured order, and caps the amount of
//! text returned to the client.

use std::sync::Arc;

use crate::acquire::AcquiredImage;
use crate::config::OcrConfig;

use super::provider::{OcrProviderTrait, OllamaProvider, OpenAiProvider, TesseractProvider};
use super::types::{OcrError, OcrOutcome, OcrProviderKind};

/// Long-lived OCR service shared by all requests.
///
/// Built once at startup; holds no per-request state.
pub struct OcrService {
    config: OcrConfig,
    providers: Vec<Arc<dyn OcrProviderTrait>>,
}

impl OcrService {
    /// Create a service with providers built from the configured order.
    pub fn new(config: OcrConfig, client: reqwest::Client) -> Self {
        let mut providers: Vec<Arc<dyn OcrProviderTrait>> = Vec::new();

        for kind in &config.providers {
            match kind {
                OcrProviderKind::Tesseract => {
                    providers.push(Arc::new(TesseractProvider::new(&config.language)));
                }
                OcrProviderKind::Ollama => {
                    providers.push(Arc::new(OllamaProvider::new(
                        client.clone(),
                        &config.ollama_url,
                        &config.ollama_model,
                    )));
                }
                OcrProviderKind::OpenAi => {
                    providers.push(Arc::new(OpenAiProvider::new(
                        client.clone(),
                        &config.openai_base_url,
                        config.openai_api_key.clone(),
                        &config.openai_model,
                    )));
                }
            }
        }

        Self { config, providers }
    }

    /// Create a service over an explicit provider list.
    pub fn with_providers(config: OcrConfig, providers: Vec<Arc<dyn OcrProviderTrait>>) -> Self {
        Self { config, providers }
    }

    /// Kinds of providers that are currently usable.
    pub async fn available_providers(&self) -> Vec<OcrProviderKind> {
        let mut available = Vec::new();
        for provider in &self.providers {
            if provider.is_available().await {
                available.push(provider.kind());
            }
        }
        available
    }

    /// Extract text from a validated image.
    ///
    /// If `preferred` is set, only that provider is tried; otherwise the
    /// providers run in configured order until one succeeds.
    pub async fn recognize(
        &self,
        image: &AcquiredImage,
        preferred: Option<OcrProviderKind>,
        language: Option<&str>,
    ) -> Result<OcrOutcome, OcrError> {
        let lang = language.unwrap_or(&self.config.language);

        if let Some(preferred) = preferred {
            for provider in &self.providers {
                if provider.kind() == preferred {
                    if provider.is_available().await {
                        let text = provider.recognize(image, Some(lang)).await?;
                        return Ok(self.outcome(text, preferred));
                    }
                    return Err(OcrError::ProviderUnavailable(format!(
                        "{} provider is not available",
                        preferred
                    )));
                }
            }
            return Err(OcrError::ProviderUnavailable(format!(
                "{} provider is not configured",
                preferred
            )));
        }

        for provider in &self.providers {
            if provider.is_available().await {
                match provider.recognize(image, Some(lang)).await {
                    Ok(text) => return Ok(self.outcome(text, provider.kind())),
                    Err(e) => {
                        tracing::warn!(
                            "OCR provider {} failed: {}, trying next",
                            provider.kind(),
                            e
                        );
                        continue;
                    }
                }
            }
        }

        Err(OcrError::ProviderUnavailable(
            "no OCR providers available".to_string(),
        ))
    }

    fn outcome(&self, text: String, provider: OcrProviderKind) -> OcrOutcome {
        OcrOutcome {
            text: truncate_text(text, self.config.max_text_len),
            provider,
        }
    }
}

/// Cap text at a maximum number of characters (not bytes), so the limit
/// matches the `length` reported to clients.
fn truncate_text(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::provider::MockProvider;
    use axum::body::Bytes;

    fn test_image() -> AcquiredImage {
        AcquiredImage {
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
            mime_type: "image/png",
        }
    }

    fn mock(
        kind: OcrProviderKind,
        text: &str,
        available: bool,
        fail: bool,
    ) -> Arc<dyn OcrProviderTrait> {
        Arc::new(MockProvider {
            kind,
            text: text.to_string(),
            available,
            fail,
        })
    }

    #[tokio::test]
    async fn falls_back_to_next_provider_on_failure() {
        let service = OcrService::with_providers(
            OcrConfig::default(),
            vec![
                mock(OcrProviderKind::Tesseract, "", true, true),
                mock(OcrProviderKind::Ollama, "fallback text", true, false),
            ],
        );

        let outcome = service.recognize(&test_image(), None, None).await.unwrap();
        assert_eq!(outcome.text, "fallback text");
        assert_eq!(outcome.provider, OcrProviderKind::Ollama);
    }

    #[tokio::test]
    async fn skips_unavailable_providers() {
        let service = OcrService::with_providers(
            OcrConfig::default(),
            vec![
                mock(OcrProviderKind::Tesseract, "never", false, false),
                mock(OcrProviderKind::Ollama, "from ollama", true, false),
            ],
        );

        let outcome = service.recognize(&test_image(), None, None).await.unwrap();
        assert_eq!(outcome.provider, OcrProviderKind::Ollama);
    }

    #[tokio::test]
    async fn preferred_provider_must_be_available() {
        let service = OcrService::with_providers(
            OcrConfig::default(),
            vec![mock(OcrProviderKind::Tesseract, "x", false, false)],
        );

        let err = service
            .recognize(&test_image(), Some(OcrProviderKind::Tesseract), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn unconfigured_preferred_provider_errors() {
        let service = OcrService::with_providers(
            OcrConfig::default(),
            vec![mock(OcrProviderKind::Tesseract, "x", true, false)],
        );

        let err = service
            .recognize(&test_image(), Some(OcrProviderKind::OpenAi), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn no_available_provider_errors() {
        let service = OcrService::with_providers(
            OcrConfig::default(),
            vec![mock(OcrProviderKind::Tesseract, "x", false, false)],
        );

        let err = service.recognize(&test_image(), None, None).await.unwrap_err();
        assert!(matches!(err, OcrError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn long_output_is_truncated() {
        let mut config = OcrConfig::default();
        config.max_text_len = 10;

        let service = OcrService::with_providers(
            config,
            vec![mock(OcrProviderKind::Tesseract, "0123456789abcdef", true, false)],
        );

        let outcome = service.recognize(&test_image(), None, None).await.unwrap();
        assert_eq!(outcome.text, "0123456789");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // "coração" is 7 chars but 9 bytes; the cap is on characters
        assert_eq!(truncate_text("coração".to_string(), 6), "coraçã");
        assert_eq!(truncate_text("coração".to_string(), 7), "coração");
        assert_eq!(truncate_text("abc".to_string(), 10), "abc");
    }

    #[tokio::test]
    async fn truncated_accented_text_keeps_the_full_character_budget() {
        let mut config = OcrConfig::default();
        config.max_text_len = 4;

        let service = OcrService::with_providers(
            config,
            vec![mock(OcrProviderKind::Tesseract, "ééééé", true, false)],
        );

        let outcome = service.recognize(&test_image(), None, None).await.unwrap();
        assert_eq!(outcome.text, "éééé");
        assert_eq!(outcome.text.chars().count(), 4);
    }
}
