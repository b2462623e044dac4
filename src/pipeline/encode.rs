//! Transport encoding: raw bytes → base64 request payloads.
//!
//! Documents travel as a `data:<mime>;base64,…` URL in a `document_url`
//! payload; images travel as bare base64 in an `image_base64` payload.
//! Images pulled out of PDFs are re-encoded as PNG first because their
//! samples are not a file format on their own.

use crate::client::{OcrDocument, OcrRequest};
use crate::config::ConverterConfig;
use crate::format::{self, FileKind};
use crate::pipeline::input::ConversionRequest;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Standard base64 with padding.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", encode_base64(bytes))
}

/// Build the OCR request body for a loaded file.
///
/// Returns `None` for unsupported files, which are never sent.
pub fn build_ocr_request(request: &ConversionRequest, config: &ConverterConfig) -> Option<OcrRequest> {
    let (document, include_image_base64) = match request.kind {
        FileKind::Document => {
            let mime = format::document_mime_type(&request.extension);
            (
                OcrDocument::DocumentUrl {
                    document_url: data_uri(mime, &request.bytes),
                },
                Some(config.include_image_base64),
            )
        }
        FileKind::Image => (
            OcrDocument::ImageBase64 {
                document: encode_base64(&request.bytes),
            },
            None,
        ),
        FileKind::Unsupported => return None,
    };

    debug!(
        "Encoded {} → {:?} payload of {} input bytes",
        request.path.display(),
        request.kind,
        request.bytes.len()
    );

    Some(OcrRequest {
        model: config.model.clone(),
        document,
        include_image_base64,
    })
}

/// Encode a decoded image as base64 PNG for the vision model.
///
/// PNG is lossless; JPEG artefacts on small text hurt OCR accuracy.
pub fn encode_png(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(encode_base64(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn request(kind: FileKind, ext: &str, bytes: &[u8]) -> ConversionRequest {
        ConversionRequest {
            path: PathBuf::from(format!("in.{ext}")),
            bytes: bytes.to_vec(),
            kind,
            extension: ext.to_string(),
        }
    }

    #[test]
    fn data_uri_format() {
        assert_eq!(data_uri("application/pdf", b"ABC"), "data:application/pdf;base64,QUJD");
    }

    #[test]
    fn document_uses_document_url_with_mime() {
        let config = ConverterConfig::default();
        let req = build_ocr_request(&request(FileKind::Document, "docx", b"ABC"), &config).unwrap();
        assert_eq!(req.model, "mistral-ocr-latest");
        assert_eq!(req.include_image_base64, Some(true));
        match req.document {
            OcrDocument::DocumentUrl { document_url } => {
                assert!(document_url.starts_with(
                    "data:application/vnd.openxmlformats-officedocument.wordprocessingml.document;base64,"
                ));
                assert!(document_url.ends_with("QUJD"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn image_uses_bare_base64() {
        let config = ConverterConfig::default();
        let req = build_ocr_request(&request(FileKind::Image, "png", b"ABC"), &config).unwrap();
        assert_eq!(req.include_image_base64, None);
        assert_eq!(
            req.document,
            OcrDocument::ImageBase64 {
                document: "QUJD".into()
            }
        );
    }

    #[test]
    fn unsupported_builds_nothing() {
        let config = ConverterConfig::default();
        assert!(build_ocr_request(&request(FileKind::Unsupported, "txt", b"x"), &config).is_none());
    }

    #[test]
    fn png_encoding_is_valid_base64_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 128, 255])));
        let b64 = encode_png(&img).expect("encode should succeed");
        let decoded = STANDARD.decode(b64).expect("valid base64");
        assert_eq!(&decoded[..8], b"\x89PNG\r\n\x1a\n");
    }
}
