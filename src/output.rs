//! Result types returned by conversions and batch runs.

use crate::error::ExtractionWarning;
use serde::{Deserialize, Serialize};

/// One page of a document OCR response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 0-indexed page number as reported by the service.
    pub index: usize,
    /// Markdown for this page.
    #[serde(default)]
    pub markdown: String,
}

impl PageResult {
    pub fn new(index: usize, markdown: impl Into<String>) -> Self {
        Self {
            index,
            markdown: markdown.into(),
        }
    }

    /// 1-indexed page number used in page markers.
    pub fn page_num(&self) -> usize {
        self.index + 1
    }
}

/// Outcome of [`crate::Converter::convert_file`].
///
/// `convert_file` never returns `Err`; a failed conversion is reported here
/// so batch runs can keep going.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    /// The written Markdown, or empty on failure.
    pub markdown: String,
    /// Error description on failure.
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn success(markdown: String) -> Self {
        Self {
            success: true,
            markdown,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            markdown: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Success/failure counts accumulated over one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTally {
    pub success: usize,
    pub failed: usize,
}

impl BatchTally {
    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    pub fn record(&mut self, result: &ConversionResult) {
        if result.success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Text recovered from one embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImageText {
    /// 1-indexed page the image was found on.
    pub page: u32,
    /// XObject resource name, e.g. `Im1`.
    pub name: String,
    pub text: String,
}

/// Outcome of [`crate::Converter::extract_embedded_images`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddedImageReport {
    pub images: Vec<EmbeddedImageText>,
    /// Images that were found but could not be decoded or OCR'd.
    pub skipped: Vec<ExtractionWarning>,
}

impl EmbeddedImageReport {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_records_outcomes() {
        let mut tally = BatchTally::default();
        tally.record(&ConversionResult::success("# ok".into()));
        tally.record(&ConversionResult::failure("boom"));
        tally.record(&ConversionResult::success(String::new()));
        assert_eq!(tally, BatchTally { success: 2, failed: 1 });
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn failure_has_empty_markdown() {
        let r = ConversionResult::failure("no key");
        assert!(!r.success);
        assert!(r.markdown.is_empty());
        assert_eq!(r.error.as_deref(), Some("no key"));
    }

    #[test]
    fn page_result_missing_markdown_defaults_empty() {
        let p: PageResult = serde_json::from_str(r#"{"index": 2}"#).unwrap();
        assert_eq!(p, PageResult::new(2, ""));
        assert_eq!(p.page_num(), 3);
    }
}
