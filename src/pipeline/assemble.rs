//! Reassemble OCR responses into one Markdown document.
//!
//! Pages are emitted in the order the service returned them. Each page is
//! prefixed with an HTML comment marker carrying its 1-indexed number, and
//! pages are separated by one blank line.

use crate::output::{EmbeddedImageReport, PageResult};
use crate::prompts::embedded_image_heading;
use tracing::info;

/// `<!-- Page N -->` for a 0-indexed page.
pub fn page_marker(index: usize) -> String {
    format!("<!-- Page {} -->", index + 1)
}

/// Join document pages: `<!-- Page 1 -->\nA\n\n<!-- Page 2 -->\nB`.
pub fn assemble_document(pages: &[PageResult]) -> String {
    pages
        .iter()
        .map(|page| {
            info!("Processing page {}...", page.page_num());
            format!("{}\n{}", page_marker(page.index), page.markdown)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Markdown of an image response: its only page, or empty.
pub fn assemble_image(pages: &[PageResult]) -> String {
    pages.first().map(|p| p.markdown.clone()).unwrap_or_default()
}

/// Sidecar document listing text recovered from embedded images.
pub fn assemble_embedded(report: &EmbeddedImageReport) -> String {
    let mut parts: Vec<String> = report
        .images
        .iter()
        .map(|img| format!("{}\n\n{}", embedded_image_heading(img.page, &img.name), img.text.trim()))
        .collect();

    if !report.skipped.is_empty() {
        let list = report
            .skipped
            .iter()
            .map(|w| format!("- {w}"))
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("<!-- Skipped images -->\n{list}"));
    }

    parts.join("\n\n")
}
