//! File classification by extension.
//!
//! The OCR service accepts two request shapes, so every input is sorted into
//! one of two fixed extension sets before anything is read or sent. The
//! lookup is case-insensitive; a file without an extension is unsupported.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions submitted as whole-document OCR requests.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "pptx", "docx"];

/// Extensions submitted as single-image OCR requests.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "avif"];

/// MIME type sent when a document extension has no table entry.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// How a file is sent to the OCR service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Multi-page document (pdf, pptx, docx).
    Document,
    /// Single raster image.
    Image,
    /// Anything else; never sent.
    Unsupported,
}

impl FileKind {
    pub fn is_supported(self) -> bool {
        self != FileKind::Unsupported
    }
}

/// Lower-cased extension of `path`, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Classify a path by its extension.
pub fn classify(path: impl AsRef<Path>) -> FileKind {
    match extension_of(path.as_ref()) {
        Some(ext) => classify_extension(&ext),
        None => FileKind::Unsupported,
    }
}

/// Classify a bare extension (no leading dot, any case).
pub fn classify_extension(ext: &str) -> FileKind {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Document
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Image
    } else {
        FileKind::Unsupported
    }
}

/// Whether the batch walker should pick this file up.
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    classify(path).is_supported()
}

/// MIME type used in the `document_url` data URI for a document extension.
pub fn document_mime_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => FALLBACK_MIME,
    }
}

/// Reverse lookup used when a caller declares a MIME type but the file name
/// carries no usable extension.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    let ext = match mime.as_str() {
        "application/pdf" => "pdf",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/avif" => "avif",
        _ => return None,
    };
    Some(ext)
}

/// Human-readable extension for error messages: `.txt`, or `(none)`.
pub fn display_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(e) => format!(".{e}"),
        None => "(none)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_classify_as_document() {
        for ext in DOCUMENT_EXTENSIONS {
            assert_eq!(classify(format!("file.{ext}")), FileKind::Document, "{ext}");
        }
    }

    #[test]
    fn images_classify_as_image() {
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(classify(format!("file.{ext}")), FileKind::Image, "{ext}");
        }
    }

    #[test]
    fn everything_else_is_unsupported() {
        for name in ["a.txt", "a.md", "a.doc", "a.tiff", "a.pdf.bak", "README", ".pdf", "a."] {
            assert_eq!(classify(name), FileKind::Unsupported, "{name}");
        }
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(classify("SCAN.PDF"), FileKind::Document);
        assert_eq!(classify("photo.JpEg"), FileKind::Image);
        assert_eq!(classify_extension(".PNG"), FileKind::Image);
    }

    #[test]
    fn mime_table() {
        assert_eq!(document_mime_type("pdf"), "application/pdf");
        assert!(document_mime_type("PPTX").ends_with("presentationml.presentation"));
        assert!(document_mime_type("docx").ends_with("wordprocessingml.document"));
        assert_eq!(document_mime_type("xyz"), FALLBACK_MIME);
    }

    #[test]
    fn mime_reverse_lookup() {
        assert_eq!(extension_for_mime("application/pdf"), Some("pdf"));
        assert_eq!(extension_for_mime("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(extension_for_mime("text/plain"), None);
    }

    #[test]
    fn display_extension_forms() {
        assert_eq!(display_extension(Path::new("a.txt")), ".txt");
        assert_eq!(display_extension(Path::new("Makefile")), "(none)");
    }
}
