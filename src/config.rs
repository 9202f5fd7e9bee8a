//! Configuration management for Leitor Server

use std::env;
use std::time::Duration;

use crate::acquire::DEFAULT_DOWNLOAD_TIMEOUT;
use crate::ocr::OcrProviderKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub acquire: AcquireConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Hard limit on a single image download, body read included.
    pub download_timeout: Duration,
    /// Request body cap for JSON and multipart uploads.
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Provider order; the first available one wins.
    pub providers: Vec<OcrProviderKind>,
    /// Default language pack(s) for extraction, e.g. "eng+por".
    pub language: String,
    /// Cap on the extracted text returned to clients.
    pub max_text_len: usize,
    pub ollama_url: String,
    pub ollama_model: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 10000,
            },
            acquire: AcquireConfig {
                download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
                max_body_bytes: 10 * 1024 * 1024,
            },
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            providers: vec![OcrProviderKind::Tesseract, OcrProviderKind::Ollama],
            language: "eng+por".to_string(),
            max_text_len: 20_000,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            acquire: AcquireConfig {
                download_timeout: env::var("DOWNLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.acquire.download_timeout),
                max_body_bytes: env::var("MAX_BODY_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.acquire.max_body_bytes),
            },
            ocr: OcrConfig {
                providers: env::var("OCR_PROVIDERS")
                    .ok()
                    .map(|raw| parse_providers(&raw))
                    .filter(|providers| !providers.is_empty())
                    .unwrap_or(defaults.ocr.providers),
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                max_text_len: env::var("OCR_MAX_TEXT_LEN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.ocr.max_text_len),
                ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
                openai_base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or(defaults.ocr.openai_base_url),
                openai_api_key: env::var("OPENAI_API_KEY").ok(),
                openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.ocr.openai_model),
            },
        }
    }
}

/// Parse a comma-separated provider list, keeping order and dropping
/// anything unrecognized (with a warning).
fn parse_providers(raw: &str) -> Vec<OcrProviderKind> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<OcrProviderKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::warn!("ignoring OCR_PROVIDERS entry: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_list_in_order() {
        assert_eq!(
            parse_providers("openai, tesseract"),
            vec![OcrProviderKind::OpenAi, OcrProviderKind::Tesseract]
        );
    }

    #[test]
    fn drops_unknown_providers() {
        assert_eq!(
            parse_providers("tesseract,magic-eyes"),
            vec![OcrProviderKind::Tesseract]
        );
        assert!(parse_providers("").is_empty());
    }
}
