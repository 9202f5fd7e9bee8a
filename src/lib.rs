//! Leitor Server Library
//!
//! Exposes the acquisition pipeline, OCR service, and router so integration
//! tests can assemble the app. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `acquire`: image acquisition & validation pipeline (URL or upload)
//! - `ocr`: text-extraction backends behind a provider trait
//! - `routes`: HTTP surface (`/health`, `/ocr`)

pub mod acquire;
pub mod config;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod state;
