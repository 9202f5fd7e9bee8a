//! End-to-end API tests with a stubbed OCR backend
//!
//! Exercises the full request path (extractor, acquisition, error mapping)
//! while replacing the text-extraction backend with a stub provider.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use leitor_server::acquire::AcquiredImage;
use leitor_server::config::Config;
use leitor_server::ocr::{OcrError, OcrProviderKind, OcrProviderTrait, OcrService};
use leitor_server::routes;
use leitor_server::state::AppState;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
const BOUNDARY: &str = "leitor-test-boundary";

struct StubProvider {
    text: &'static str,
    available: bool,
    fail: bool,
}

#[async_trait]
impl OcrProviderTrait for StubProvider {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::Tesseract
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
            Err(OcrError::ProcessingFailed("stub backend exploded".to_string()))
        } else {
            Ok(self.text.to_string())
        }
    }
}

fn test_server(provider: StubProvider) -> TestServer {
    let config = Config::default();
    let ocr = OcrService::with_providers(config.ocr.clone(), vec![Arc::new(provider)]);
    let state = AppState::new(config, reqwest::Client::new(), ocr);
    TestServer::new(routes::router(state)).unwrap()
}

fn working_stub() -> StubProvider {
    StubProvider {
        text: "extracted text",
        available: true,
        fail: false,
    }
}

/// Hand-rolled multipart body; each part is (name, optional filename, data).
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match filename {
            Some(f) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

#[tokio::test]
async fn health_reports_ok() {
    let server = test_server(working_stub());

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "leitor");
}

#[tokio::test]
async fn empty_request_is_missing_source() {
    let server = test_server(working_stub());

    let response = server.post("/ocr").json(&json!({})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "MISSING_SOURCE");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let server = test_server(working_stub());

    let response = server
        .post("/ocr")
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{not json at all"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn png_upload_returns_extracted_text() {
    let server = test_server(working_stub());

    let body = multipart_body(&[("image", Some("scan.png"), PNG_MAGIC)]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["text"], "extracted text");
    assert_eq!(body["provider"], "tesseract");
    assert_eq!(body["length"], "extracted text".len());
}

#[tokio::test]
async fn text_upload_is_rejected_as_unsupported() {
    let server = test_server(working_stub());

    let body = multipart_body(&[("image", Some("notes.png"), b"dear diary, not an image")]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "UNSUPPORTED_TYPE");
}

#[tokio::test]
async fn upload_wins_when_url_is_also_present() {
    let server = test_server(working_stub());

    // The URL points at a closed port; if it were fetched the request would
    // fail. Success proves the uploaded file took precedence.
    let body = multipart_body(&[
        ("url", None, b"http://127.0.0.1:1/never.png"),
        ("image", Some("scan.png"), PNG_MAGIC),
    ]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn language_field_is_accepted_in_multipart() {
    let server = test_server(working_stub());

    let body = multipart_body(&[
        ("image", Some("scan.png"), PNG_MAGIC),
        ("language", None, b"por"),
    ]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_provider_field_is_a_client_error() {
    let server = test_server(working_stub());

    let body = multipart_body(&[
        ("image", Some("scan.png"), PNG_MAGIC),
        ("provider", None, b"magic-eyes"),
    ]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_failure_maps_to_server_error() {
    let server = test_server(StubProvider {
        text: "",
        available: true,
        fail: true,
    });

    let body = multipart_body(&[("image", Some("scan.png"), PNG_MAGIC)]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    // Single provider failing means no provider produced text
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "PROVIDER_UNAVAILABLE");
}

#[tokio::test]
async fn unavailable_backend_maps_to_503() {
    let server = test_server(StubProvider {
        text: "",
        available: false,
        fail: false,
    });

    let body = multipart_body(&[("image", Some("scan.png"), PNG_MAGIC)]);
    let response = server
        .post("/ocr")
        .content_type(&multipart_content_type())
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn bad_remote_url_surfaces_download_failure() {
    let server = test_server(working_stub());

    let response = server
        .post("/ocr")
        .json(&json!({ "url": "http://127.0.0.1:1/photo.png" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "UPSTREAM_UNREACHABLE");
}
