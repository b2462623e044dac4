//! Prompts sent to the vision model.
//!
//! Only the embedded-image path talks to a chat model; document and image
//! OCR requests carry no instructions at all.

/// Instruction sent alongside each image extracted from a PDF.
pub const IMAGE_OCR_PROMPT: &str = "Please extract all text from this image. \
Format the output as clean text without any additional explanations.";

/// Heading used for one image in the embedded-image sidecar document.
pub fn embedded_image_heading(page: u32, name: &str) -> String {
    format!("## Page {page} — image {name}")
}
