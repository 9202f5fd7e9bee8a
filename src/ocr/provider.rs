//! OCR Providers
//!
//! Defines the provider trait and implementations for the different
//! text-extraction backends. Providers receive an already-validated
//! [`AcquiredImage`]; they never re-check the content type.

use async_trait::async_trait;
use base64::Engine;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::acquire::AcquiredImage;

use super::types::{OcrError, OcrProviderKind};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the provider kind
    fn kind(&self) -> OcrProviderKind;

    /// Check if the provider is usable right now
    async fn is_available(&self) -> bool;

    /// Extract text from a validated image
    async fn recognize(
        &self,
        image: &AcquiredImage,
        language: Option<&str>,
    ) -> Result<String, OcrError>;
}

/// Instruction prompt shared by the vision-model providers.
fn extraction_prompt(language: Option<&str>) -> String {
    let lang_hint = language
        .map(|l| format!(" The text is in {}.", l))
        .unwrap_or_default();

    format!(
        "Extract all text from this image exactly as written.{} Return only the extracted text, nothing else.",
        lang_hint
    )
}

/// Tesseract CLI provider
///
/// Pipes the image through stdin/stdout so concurrent requests never share a
/// path on disk.
pub struct TesseractProvider {
    /// Default language pack(s), e.g. "eng+por"
    default_language: String,
}

impl TesseractProvider {
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: default_language.to_string(),
        }
    }
}

#[async_trait]
impl OcrProviderTrait for TesseractProvider {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::Tesseract
    }

    async fn is_available(&self) -> bool {
        // Check if tesseract is installed
        Command::new("tesseract")
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn recognize(
        &self,
        image: &AcquiredImage,
        language: Option<&str>,
    ) -> Result<String, OcrError> {
        let lang = language.unwrap_or(&self.default_language);

        let mut child = Command::new("tesseract")
            .args(["stdin", "stdout", "-l", lang, "--oem", "3", "--psm", "3"])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| OcrError::ProcessingFailed(format!("failed to spawn tesseract: {e}")))?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            OcrError::ProcessingFailed("tesseract stdin not captured".to_string())
        })?;
        stdin
            .write_all(&image.bytes)
            .await
            .map_err(|e| OcrError::ProcessingFailed(format!("failed to feed tesseract: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::ProcessingFailed(format!("failed to run tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingFailed(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Ollama vision model provider
pub struct OllamaProvider {
    client: reqwest::Client,
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
}

impl OllamaProvider {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl OcrProviderTrait for OllamaProvider {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::Ollama
    }

    async fn is_available(&self) -> bool {
        // Check if Ollama is running
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize(
        &self,
        image: &AcquiredImage,
        language: Option<&str>,
    ) -> Result<String, OcrError> {
        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

        let request = serde_json::json!({
            "model": self.model,
            "prompt": extraction_prompt(language),
            "images": [image_base64],
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("failed to call Ollama: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("failed to parse Ollama response: {e}")))?;

        Ok(result["response"].as_str().unwrap_or("").trim().to_string())
    }
}

/// Remote OpenAI-compatible vision API provider
///
/// Sends the image as a base64 data URI to a chat-completions endpoint.
/// Without an API key the provider reports itself unavailable.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl OcrProviderTrait for OpenAiProvider {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::OpenAi
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn recognize(
        &self,
        image: &AcquiredImage,
        language: Option<&str>,
    ) -> Result<String, OcrError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            OcrError::ProviderUnavailable("no API key configured".to_string())
        })?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        let data_uri = format!("data:{};base64,{}", image.mime_type, image_base64);

        let request = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": extraction_prompt(language) },
                    { "type": "image_url", "image_url": { "url": data_uri } }
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("failed to call vision API: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "vision API returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("failed to parse vision response: {e}")))?;

        let text = result["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(text)
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub kind: OcrProviderKind,
    pub text: String,
    pub available: bool,
    pub fail: bool,
}

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for MockProvider {
    fn kind(&self) -> OcrProviderKind {
        self.kind
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(
        &self,
        _image: &AcquiredImage,
        _language: Option<&str>,
    ) -> Result<String, OcrError> {
        if self.fail {
            Err(OcrError::ProcessingFailed("mock failure".to_string()))
        } else {
            Ok(self.text.clone())
        }
    }
}
