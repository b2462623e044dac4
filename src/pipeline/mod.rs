//! Pipeline stages for document-to-Markdown conversion.
//!
//! Each submodule implements one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ (OCR service) ──▶ assemble
//! (path/bytes) (base64)   (client.rs)     (page markers)
//!
//! extract ──▶ encode::encode_png ──▶ (vision model) ──▶ assemble_embedded
//! (lopdf)
//! ```
//!
//! 1. [`input`]    — validate and read a path, or stage in-memory bytes
//! 2. [`encode`]   — wrap file bytes into the request payload for the service
//! 3. [`assemble`] — join per-page Markdown into one document
//! 4. [`extract`]  — pull embedded raster images out of a PDF; CPU-bound, so
//!    callers run it in `spawn_blocking`

pub mod assemble;
pub mod encode;
pub mod extract;
pub mod input;
