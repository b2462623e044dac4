//! The remote OCR service: request/response shapes and the HTTP client.
//!
//! [`OcrService`] is the seam between the converter and the network. The
//! production implementation is [`MistralOcrClient`]; tests provide their own
//! implementations through [`crate::ConverterConfigBuilder::service`].

use crate::config::ConverterConfig;
use crate::error::{DocMistralError, TransportError};
use crate::output::PageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Body of an OCR request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrRequest {
    pub model: String,
    pub document: OcrDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_image_base64: Option<bool>,
}

/// The payload, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OcrDocument {
    /// Whole document as a `data:<mime>;base64,…` URL.
    DocumentUrl { document_url: String },
    /// Single image as bare base64.
    ImageBase64 { document: String },
}

/// Body of an OCR response. Pages are kept in the order received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<PageResult>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage_info: Option<UsageInfo>,
}

/// Billing counters reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: Option<u64>,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}

/// Something that can answer an [`OcrRequest`].
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, TransportError>;
}

/// HTTP client for the Mistral OCR endpoint.
///
/// Holds no per-call state; one instance is shared by every conversion.
pub struct MistralOcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl fmt::Debug for MistralOcrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralOcrClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl MistralOcrClient {
    pub fn new(config: &ConverterConfig, api_key: impl Into<String>) -> Result<Self, DocMistralError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("docmistral/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DocMistralError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim().to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OcrService for MistralOcrClient {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, TransportError> {
        debug!("POST {} (model {})", self.endpoint, request.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: OcrResponse = serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        debug!(
            "OCR response: {} pages{}",
            parsed.pages.len(),
            parsed
                .usage_info
                .as_ref()
                .and_then(|u| u.pages_processed)
                .map(|n| format!(", {n} billed"))
                .unwrap_or_default()
        );
        Ok(parsed)
    }
}
