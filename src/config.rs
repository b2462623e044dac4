//! Configuration types for document-to-Markdown conversion.
//!
//! All converter behaviour is controlled through [`ConverterConfig`], built
//! via its [`ConverterConfigBuilder`]. The credential travels inside this
//! value into [`crate::Converter::new`]; nothing is read from globals.

use crate::client::OcrService;
use crate::error::DocMistralError;
use crate::progress::ProgressCallback;
use crate::vision::ImageOcr;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Mistral OCR endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/ocr";

/// OCR model used for both document and image requests.
pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-latest";

/// Vision chat model used for embedded-image OCR.
pub const DEFAULT_VISION_MODEL: &str = "pixtral-12b-2409";

/// Upload limit documented by the OCR service (50 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for a [`crate::Converter`].
///
/// Built via [`ConverterConfig::builder()`] or using
/// [`ConverterConfig::default()`].
///
/// # Example
/// ```rust
/// use docmistral::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .api_key("sk-test")
///     .model("mistral-ocr-latest")
///     .build()
///     .unwrap();
/// assert!(config.api_key.is_some());
/// ```
#[derive(Clone)]
pub struct ConverterConfig {
    /// Mistral API key. Without it (and without `service`) every conversion
    /// fails with [`DocMistralError::ClientNotConfigured`].
    pub api_key: Option<String>,

    /// OCR endpoint URL. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// OCR model identifier. Default: [`DEFAULT_OCR_MODEL`].
    pub model: String,

    /// Vision model for embedded images. Default: [`DEFAULT_VISION_MODEL`].
    pub vision_model: String,

    /// Ask the service to return page images in document responses. Default: true.
    pub include_image_base64: bool,

    /// Per-request timeout in seconds. Default: none; a hung service stalls
    /// the caller.
    pub request_timeout_secs: Option<u64>,

    /// Files larger than this are rejected before upload. Default: 50 MiB.
    pub max_file_bytes: u64,

    /// Directory for staging in-memory uploads. Default: system temp dir.
    pub staging_dir: Option<PathBuf>,

    /// Pre-constructed OCR service. Takes precedence over `api_key`.
    pub service: Option<Arc<dyn OcrService>>,

    /// Pre-constructed embedded-image OCR backend. If None, a Mistral vision
    /// provider is created on first use.
    pub image_ocr: Option<Arc<dyn ImageOcr>>,

    /// Receives batch progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_OCR_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            include_image_base64: true,
            request_timeout_secs: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            staging_dir: None,
            service: None,
            image_ocr: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("vision_model", &self.vision_model)
            .field("include_image_base64", &self.include_image_base64)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("staging_dir", &self.staging_dir)
            .field("service", &self.service.as_ref().map(|_| "<dyn OcrService>"))
            .field("image_ocr", &self.image_ocr.as_ref().map(|_| "<dyn ImageOcr>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Blank keys are treated as absent.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key.trim().to_string())
        };
        self
    }

    pub fn maybe_api_key(self, key: Option<String>) -> Self {
        match key {
            Some(k) => self.api_key(k),
            None => self,
        }
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn include_image_base64(mut self, v: bool) -> Self {
        self.config.include_image_base64 = v;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n;
        self
    }

    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.staging_dir = Some(dir.into());
        self
    }

    pub fn service(mut self, service: Arc<dyn OcrService>) -> Self {
        self.config.service = Some(service);
        self
    }

    pub fn image_ocr(mut self, backend: Arc<dyn ImageOcr>) -> Self {
        self.config.image_ocr = Some(backend);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, DocMistralError> {
        let c = &self.config;
        let endpoint = c.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(DocMistralError::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.model.trim().is_empty() {
            return Err(DocMistralError::InvalidConfig("model must not be empty".into()));
        }
        if c.vision_model.trim().is_empty() {
            return Err(DocMistralError::InvalidConfig(
                "vision model must not be empty".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(DocMistralError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_file_bytes == 0 {
            return Err(DocMistralError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConverterConfig::default();
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.model, "mistral-ocr-latest");
        assert_eq!(c.vision_model, "pixtral-12b-2409");
        assert!(c.include_image_base64);
        assert_eq!(c.request_timeout_secs, None);
        assert_eq!(c.max_file_bytes, 50 * 1024 * 1024);
        assert!(c.api_key.is_none() && c.service.is_none());
    }

    #[test]
    fn blank_key_is_absent() {
        let c = ConverterConfig::builder().api_key("   ").build().unwrap();
        assert!(c.api_key.is_none());
        let c = ConverterConfig::builder()
            .maybe_api_key(Some(" k ".into()))
            .build()
            .unwrap();
        assert_eq!(c.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn rejects_bad_endpoint() {
        let err = ConverterConfig::builder()
            .endpoint("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, DocMistralError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_timeout_and_limit() {
        assert!(ConverterConfig::builder().request_timeout_secs(0).build().is_err());
        assert!(ConverterConfig::builder().max_file_bytes(0).build().is_err());
        assert!(ConverterConfig::builder().request_timeout_secs(30).build().is_ok());
    }

    #[test]
    fn debug_redacts_key() {
        let c = ConverterConfig::builder().api_key("super-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
