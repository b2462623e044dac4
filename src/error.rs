//! Error types for the docmistral library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`DocMistralError`] — **Fatal** for one conversion call: the file is
//!   missing, has the wrong extension, the client has no credential, or the
//!   service call failed. Returned as `Err(DocMistralError)` from
//!   [`crate::Converter::convert`] and friends.
//!
//! * [`TransportError`] — the underlying cause of a failed service call
//!   (network error, non-2xx status, unparsable body). Always wrapped in
//!   [`DocMistralError::ConversionFailed`] before it reaches a caller of
//!   `convert`.
//!
//! * [`ExtractionWarning`] — **Non-fatal**: one embedded image could not be
//!   decoded or OCR'd. Collected into
//!   [`crate::output::EmbeddedImageReport::skipped`]; the remaining images
//!   are still processed.
//!
//! [`crate::Converter::convert_file`] and the batch walker flatten fatal
//! errors into [`crate::output::ConversionResult`] / [`crate::BatchTally`]
//! so one bad file never aborts a batch.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docmistral library.
#[derive(Debug, Error)]
pub enum DocMistralError {
    // ── Credential errors ─────────────────────────────────────────────────
    /// No API key was supplied on the command line or in the environment.
    #[error(
        "Mistral API key is required.\n\
Provide it via --mistral-api-key or the MISTRAL_API_KEY environment variable."
    )]
    MissingCredential,

    /// The converter was built without a credential or an injected service.
    #[error("Mistral OCR client is not configured.\n{hint}")]
    ClientNotConfigured { hint: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The batch input root exists but is not a directory.
    #[error("Input '{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// The extension is in neither the document nor the image set.
    #[error("Unsupported file format: '{extension}' ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file exceeds the upload limit of the OCR service.
    #[error("File '{path}' is {size} bytes; the OCR service accepts at most {limit} bytes")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Service errors ────────────────────────────────────────────────────
    /// The OCR request for this file failed.
    #[error("Conversion of '{path}' failed: {source}")]
    ConversionFailed {
        path: PathBuf,
        #[source]
        source: TransportError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF could not be opened for embedded image extraction.
    #[error("Failed to open PDF '{path}': {detail}")]
    PdfParseFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a call to the remote service failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("OCR service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// A 2xx answer whose body is not the expected JSON shape.
    #[error("Malformed OCR response: {0}")]
    MalformedResponse(String),

    /// The vision chat model used for embedded images failed.
    #[error("Vision model call failed: {0}")]
    Vision(String),
}

/// A non-fatal problem with a single embedded image.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractionWarning {
    /// The image stream could not be decoded into pixels.
    #[error("Page {page}: could not decode image '{name}': {detail}")]
    UnreadableImage {
        page: u32,
        name: String,
        detail: String,
    },

    /// The samples use a colour space we do not convert.
    #[error("Page {page}: image '{name}' uses unsupported colour space {color_space}")]
    UnsupportedColorSpace {
        page: u32,
        name: String,
        color_space: String,
    },

    /// The vision model call for this image failed.
    #[error("Page {page}: OCR of image '{name}' failed: {detail}")]
    OcrFailed {
        page: u32,
        name: String,
        detail: String,
    },
}
