//! # docmistral
//!
//! Convert documents (PDF, PPTX, DOCX) and images (PNG, JPEG, GIF, BMP, AVIF)
//! to Markdown using the Mistral OCR service.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file / bytes
//!  │
//!  ├─ 1. Classify  extension → document | image | unsupported (no I/O)
//!  ├─ 2. Input     size check, read, or stage bytes in a temp file
//!  ├─ 3. Encode    data URI (documents) or bare base64 (images)
//!  ├─ 4. OCR       one POST to the OCR endpoint per file
//!  └─ 5. Assemble  `<!-- Page N -->` markers, pages joined by a blank line
//! ```
//!
//! [`process_directory`] mirrors a whole input tree into an output tree of
//! `.md` files. [`Converter::extract_embedded_images`] additionally OCRs the
//! raster images embedded in a PDF through a vision model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docmistral::{Converter, ConverterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::builder()
//!         .api_key(std::env::var("MISTRAL_API_KEY")?)
//!         .build()?;
//!     let converter = Converter::new(config)?;
//!     let markdown = converter.convert("report.pdf").await?;
//!     println!("{markdown}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docmistral` binary (clap + indicatif) |
//! | `mcp`   | on      | Enables the `docmistral-mcp` stdio tool server |
//!
//! ```toml
//! docmistral = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod mcp;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod tools;
pub mod vision;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{mirrored_output_path, process_directory};
pub use client::{MistralOcrClient, OcrDocument, OcrRequest, OcrResponse, OcrService};
pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use convert::Converter;
pub use error::{DocMistralError, ExtractionWarning, TransportError};
pub use format::{classify, FileKind};
pub use output::{BatchTally, ConversionResult, EmbeddedImageReport, EmbeddedImageText, PageResult};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tools::{DocumentTools, ToolOutput};
pub use vision::{ImageOcr, VisionImageOcr};
