//! Fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docmistral::output::PageResult;
use docmistral::{ImageOcr, OcrDocument, OcrRequest, OcrResponse, OcrService, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness (`RUST_LOG` selects the level).
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Answers documents with two pages and images with one, failing the
/// call numbers listed in `fail_on` (1-indexed).
#[derive(Default)]
pub struct FakeOcr {
    pub calls: AtomicUsize,
    pub fail_on: Vec<usize>,
    pub requests: Mutex<Vec<OcrRequest>>,
}

impl FakeOcr {
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.to_vec(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrService for FakeOcr {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_on.contains(&n) {
            return Err(TransportError::Api {
                status: 500,
                body: "internal error".into(),
            });
        }
        let pages = match request.document {
            OcrDocument::DocumentUrl { .. } => {
                vec![PageResult::new(0, "A"), PageResult::new(1, "B")]
            }
            OcrDocument::ImageBase64 { .. } => vec![PageResult::new(0, "image text")],
        };
        Ok(OcrResponse {
            pages,
            ..Default::default()
        })
    }
}

/// Vision backend that returns a fixed text, or fails every call.
pub struct FakeVision {
    pub text: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeVision {
    pub fn answering(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageOcr for FakeVision {
    async fn extract_text(&self, _png_base64: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| TransportError::Vision("model unavailable".into()))
    }
}
