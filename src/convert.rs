//! The converter: classify → encode → call the OCR service → assemble.
//!
//! A [`Converter`] owns the client handle built from its
//! [`ConverterConfig`] and is reused for every file. Conversions are
//! independent of each other; the handle carries no per-call state.

use crate::client::{MistralOcrClient, OcrService};
use crate::config::ConverterConfig;
use crate::error::{DocMistralError, ExtractionWarning};
use crate::format::{self, FileKind};
use crate::output::{ConversionResult, EmbeddedImageReport, EmbeddedImageText};
use crate::pipeline::{assemble, encode, extract, input};
use crate::vision::{ImageOcr, VisionImageOcr};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Converts documents and images to Markdown through the OCR service.
pub struct Converter {
    config: ConverterConfig,
    service: Option<Arc<dyn OcrService>>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("configured", &self.service.is_some())
            .finish()
    }
}

impl Converter {
    /// Build a converter and its client handle.
    ///
    /// An injected `config.service` wins over `config.api_key`. With neither,
    /// construction succeeds but every conversion fails with
    /// [`DocMistralError::ClientNotConfigured`].
    pub fn new(config: ConverterConfig) -> Result<Self, DocMistralError> {
        let service: Option<Arc<dyn OcrService>> = match (&config.service, &config.api_key) {
            (Some(service), _) => Some(Arc::clone(service)),
            (None, Some(key)) => {
                let client = MistralOcrClient::new(&config, key.clone())?;
                info!("Mistral OCR client initialized ({})", client.endpoint());
                Some(Arc::new(client))
            }
            (None, None) => {
                warn!("No Mistral API key supplied; conversions will fail");
                None
            }
        };
        Ok(Self { config, service })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    /// Classify a path by extension.
    pub fn classify(&self, path: impl AsRef<Path>) -> FileKind {
        format::classify(path)
    }

    fn service(&self) -> Result<&Arc<dyn OcrService>, DocMistralError> {
        self.service
            .as_ref()
            .ok_or_else(|| DocMistralError::ClientNotConfigured {
                hint: "Provide an API key via --mistral-api-key or MISTRAL_API_KEY.".into(),
            })
    }

    /// Convert one file to Markdown.
    ///
    /// Documents come back as page-marked Markdown; images as the Markdown of
    /// their single page (empty if the service returned none).
    ///
    /// # Errors
    /// - [`DocMistralError::UnsupportedFormat`] — checked first; no I/O, no network
    /// - [`DocMistralError::ClientNotConfigured`] — no credential
    /// - [`DocMistralError::InputNotFound`] / [`DocMistralError::FileTooLarge`]
    /// - [`DocMistralError::ConversionFailed`] — any transport or service error
    pub async fn convert(&self, path: impl AsRef<Path>) -> Result<String, DocMistralError> {
        let path = path.as_ref();
        let kind = format::classify(path);
        if kind == FileKind::Unsupported {
            let extension = format::display_extension(path);
            warn!("File type {} is not supported by Mistral OCR", extension);
            return Err(DocMistralError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }

        let service = self.service()?;
        let request = input::load_request(path, self.config.max_file_bytes).await?;
        let ocr_request = encode::build_ocr_request(&request, &self.config).ok_or_else(|| {
            DocMistralError::Internal(format!("no request shape for {}", path.display()))
        })?;

        info!(
            "Processing {} with Mistral OCR...",
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        );

        let response = service.process(&ocr_request).await.map_err(|source| {
            error!("Mistral OCR processing failed for {}: {}", path.display(), source);
            DocMistralError::ConversionFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let markdown = match kind {
            FileKind::Document => assemble::assemble_document(&response.pages),
            _ => assemble::assemble_image(&response.pages),
        };
        debug!(
            "{}: {} pages → {} bytes of Markdown",
            path.display(),
            response.pages.len(),
            markdown.len()
        );
        Ok(markdown)
    }

    /// Convert in-memory bytes declared as `file_name`.
    ///
    /// The bytes are staged in a temporary file that is removed before this
    /// returns, on success and on failure.
    pub async fn convert_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<String, DocMistralError> {
        let declared = Path::new(file_name);
        let extension = match (format::classify(declared), format::extension_of(declared)) {
            (FileKind::Unsupported, _) | (_, None) => {
                return Err(DocMistralError::UnsupportedFormat {
                    path: declared.to_path_buf(),
                    extension: format::display_extension(declared),
                })
            }
            (_, Some(ext)) => ext,
        };

        let staged = input::stage_bytes(&extension, bytes, self.config.staging_dir.as_deref())?;
        let result = self.convert(staged.path()).await;
        drop(staged);
        result
    }

    /// Convert `input` and write the Markdown to `output`.
    ///
    /// Missing parent directories are created and an existing file is
    /// overwritten. Never returns an error: failures are logged and reported
    /// in the [`ConversionResult`].
    pub async fn convert_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> ConversionResult {
        let (input, output) = (input.as_ref(), output.as_ref());
        info!("Converting {} to {}", input.display(), output.display());

        let outcome = match self.convert(input).await {
            Ok(markdown) => write_markdown(output, &markdown).await.map(|_| markdown),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(markdown) => {
                info!(
                    "Successfully converted {}",
                    input.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                );
                ConversionResult::success(markdown)
            }
            Err(e) => {
                error!("Error converting {}: {}", input.display(), e);
                ConversionResult::failure(e.to_string())
            }
        }
    }

    /// OCR the raster images embedded in a PDF's object structure.
    ///
    /// Best-effort: images that fail to decode or OCR are listed in
    /// [`EmbeddedImageReport::skipped`]. Only a PDF that cannot be opened, a
    /// non-PDF input, or a missing vision backend is an error.
    pub async fn extract_embedded_images(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<EmbeddedImageReport, DocMistralError> {
        let path = path.as_ref().to_path_buf();
        if format::extension_of(&path).as_deref() != Some("pdf") {
            return Err(DocMistralError::UnsupportedFormat {
                extension: format::display_extension(&path),
                path,
            });
        }
        if !path.exists() {
            return Err(DocMistralError::InputNotFound { path });
        }

        let backend = self.image_ocr()?;

        let blocking_path = path.clone();
        let extracted = tokio::task::spawn_blocking(move || extract::extract_images(&blocking_path))
            .await
            .map_err(|e| DocMistralError::Internal(format!("Extraction task panicked: {e}")))??;

        info!(
            "{}: {} embedded images, {} unreadable",
            path.display(),
            extracted.images.len(),
            extracted.warnings.len()
        );

        let mut report = EmbeddedImageReport {
            images: Vec::with_capacity(extracted.images.len()),
            skipped: extracted.warnings,
        };

        for img in extracted.images {
            let png = match encode::encode_png(&img.image) {
                Ok(png) => png,
                Err(e) => {
                    let w = ExtractionWarning::UnreadableImage {
                        page: img.page,
                        name: img.name,
                        detail: format!("PNG encoding failed: {e}"),
                    };
                    warn!("{}", w);
                    report.skipped.push(w);
                    continue;
                }
            };

            match backend.extract_text(&png).await {
                Ok(text) => report.images.push(EmbeddedImageText {
                    page: img.page,
                    name: img.name,
                    text,
                }),
                Err(e) => {
                    let w = ExtractionWarning::OcrFailed {
                        page: img.page,
                        name: img.name,
                        detail: e.to_string(),
                    };
                    warn!("{}", w);
                    report.skipped.push(w);
                }
            }
        }

        Ok(report)
    }

    /// [`Self::extract_embedded_images`], then write the sidecar Markdown to
    /// `output`. Nothing is written when the PDF has no raster images.
    pub async fn extract_embedded_images_to_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<EmbeddedImageReport, DocMistralError> {
        let report = self.extract_embedded_images(input).await?;
        if !report.is_empty() {
            write_markdown(output.as_ref(), &assemble::assemble_embedded(&report)).await?;
        }
        Ok(report)
    }

    fn image_ocr(&self) -> Result<Arc<dyn ImageOcr>, DocMistralError> {
        if let Some(ref backend) = self.config.image_ocr {
            return Ok(Arc::clone(backend));
        }
        Ok(Arc::new(VisionImageOcr::from_model(&self.config.vision_model)?))
    }
}

/// Write Markdown to `path`, creating parent directories.
///
/// Uses a sibling temp file + rename so a failed write never leaves a
/// truncated `.md` behind.
pub(crate) async fn write_markdown(path: &Path, markdown: &str) -> Result<(), DocMistralError> {
    let write_err = |source| DocMistralError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    if let Err(e) = tokio::fs::write(&tmp_path, markdown).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{OcrDocument, OcrRequest, OcrResponse};
    use crate::error::TransportError;
    use crate::output::PageResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrService for CountingService {
        async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let pages = match request.document {
                OcrDocument::DocumentUrl { .. } => vec![PageResult::new(0, "A"), PageResult::new(1, "B")],
                OcrDocument::ImageBase64 { .. } => vec![],
            };
            Ok(OcrResponse {
                pages,
                ..Default::default()
            })
        }
    }

    fn converter_with(service: Arc<CountingService>) -> Converter {
        let config = ConverterConfig::builder().service(service).build().unwrap();
        Converter::new(config).unwrap()
    }

    #[tokio::test]
    async fn unsupported_never_calls_service() {
        let service = Arc::new(CountingService::default());
        let converter = converter_with(Arc::clone(&service));

        let err = converter.convert("notes.txt").await.unwrap_err();
        assert!(matches!(err, DocMistralError::UnsupportedFormat { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unconfigured_converter_fails_with_client_not_configured() {
        let converter = Converter::new(ConverterConfig::default()).unwrap();
        assert!(!converter.is_configured());
        let err = converter.convert("scan.pdf").await.unwrap_err();
        assert!(matches!(err, DocMistralError::ClientNotConfigured { .. }), "{err}");
    }

    #[tokio::test]
    async fn document_pages_are_marked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let converter = converter_with(Arc::new(CountingService::default()));
        let md = converter.convert(&path).await.unwrap();
        assert_eq!(md, "<!-- Page 1 -->\nA\n\n<!-- Page 2 -->\nB");
    }

    #[tokio::test]
    async fn image_without_pages_is_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let converter = converter_with(Arc::new(CountingService::default()));
        assert_eq!(converter.convert(&path).await.unwrap(), "");
    }

    #[tokio::test]
    async fn write_markdown_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a/b/c/out.md");

        write_markdown(&out, "first").await.unwrap();
        write_markdown(&out, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "second");
        assert!(!out.with_extension("md.tmp").exists());
    }

    #[tokio::test]
    async fn embedded_images_reject_non_pdf() {
        let converter = converter_with(Arc::new(CountingService::default()));
        let err = converter.extract_embedded_images("slides.pptx").await.unwrap_err();
        assert!(matches!(err, DocMistralError::UnsupportedFormat { .. }));
    }
}
