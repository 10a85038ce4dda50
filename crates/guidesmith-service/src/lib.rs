//! Guidesmith Service
//!
//! Composes the loader, extractor, extraction cache and template generator
//! into one pipeline:
//!
//! ```text
//! GuideDocument → size check → load → normalize → extract (cached) → generate → TemplateArtifact
//! ```
//!
//! `TemplateService` is the entry point. Construct it once, share it (or
//! its cache) between request handlers, and call `process` per upload.
//! Each `process` call runs under its own `RequestId` span.
//!
//! ```
//! use guidesmith_llm::MockProvider;
//! use guidesmith_loader::GuideDocument;
//! use guidesmith_service::{ServiceConfig, TemplateService};
//!
//! # tokio_test::block_on(async {
//! let backend = MockProvider::new(r#"{"line_spacing": 2}"#);
//! let service = TemplateService::new(backend, &ServiceConfig::default()).unwrap();
//!
//! let guide = GuideDocument::from_text("guide.txt", "Double-space everything.");
//! let output = service.process(&guide).await.unwrap();
//!
//! assert_eq!(output.rules.rules().line_spacing, 2.0);
//! assert_eq!(output.template.file_name, "template.docx");
//! # });
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod service;

pub use config::{ServiceConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::ServiceError;
pub use service::{ExtractedRules, ProcessOutput, TemplateService};
