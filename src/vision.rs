//! Vision-model OCR for images pulled out of PDFs.
//!
//! The OCR endpoint handles whole documents; images extracted from a PDF's
//! object structure are instead sent one at a time to a chat model with an
//! image attachment. [`ImageOcr`] is the seam; [`VisionImageOcr`] is the
//! edgequake-llm backed implementation.

use crate::error::{DocMistralError, TransportError};
use crate::prompts::IMAGE_OCR_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Provider name passed to [`ProviderFactory`]; the factory reads the
/// matching `MISTRAL_API_KEY` itself.
pub const VISION_PROVIDER: &str = "mistral";

/// Turns one PNG image into text.
#[async_trait]
pub trait ImageOcr: Send + Sync {
    /// `png_base64` is a base64-encoded PNG without a data-URI prefix.
    async fn extract_text(&self, png_base64: &str) -> Result<String, TransportError>;
}

/// [`ImageOcr`] backed by an edgequake-llm vision provider.
pub struct VisionImageOcr {
    provider: Arc<dyn LLMProvider>,
}

impl VisionImageOcr {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Create the Mistral vision provider for `model`.
    pub fn from_model(model: &str) -> Result<Self, DocMistralError> {
        let provider = ProviderFactory::create_llm_provider(VISION_PROVIDER, model).map_err(|e| {
            DocMistralError::ClientNotConfigured {
                hint: format!("Vision provider '{VISION_PROVIDER}' ({model}): {e}"),
            }
        })?;
        Ok(Self::new(provider))
    }
}

#[async_trait]
impl ImageOcr for VisionImageOcr {
    async fn extract_text(&self, png_base64: &str) -> Result<String, TransportError> {
        let image = ImageData::new(png_base64.to_string(), "image/png");
        let messages = vec![ChatMessage::user_with_images(IMAGE_OCR_PROMPT, vec![image])];
        let options = CompletionOptions {
            temperature: Some(0.0),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| TransportError::Vision(e.to_string()))?;

        debug!(
            "Vision OCR: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}
