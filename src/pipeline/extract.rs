//! Embedded image extraction: pull raster XObjects out of a PDF.
//!
//! This path is best-effort. Opening the document is the only fatal step;
//! every image that cannot be decoded is recorded as an
//! [`ExtractionWarning`] and skipped.
//!
//! Supported encodings:
//! - `DCTDecode` streams (JPEG bytes, decoded by the `image` crate)
//! - unfiltered or Flate/LZW-compressed 8-bit samples in DeviceRGB,
//!   DeviceGray, CalRGB, CalGray or single-stream ICCBased colour spaces
//!
//! Page resources are looked up on the page first and then on its
//! ancestors in the page tree, since `/Resources` is inheritable.

use crate::error::{DocMistralError, ExtractionWarning};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use tracing::{debug, warn};

/// Guard against cyclic `/Parent` chains in malformed page trees.
const MAX_TREE_DEPTH: usize = 64;

/// One decoded image and where it came from.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// 1-indexed page number.
    pub page: u32,
    /// Resource name, e.g. `Im1`.
    pub name: String,
    pub image: DynamicImage,
}

/// Everything found in one document.
#[derive(Debug, Default)]
pub struct ExtractedImages {
    pub images: Vec<EmbeddedImage>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Open `path` and extract every image XObject.
///
/// Blocking; call from `spawn_blocking`.
pub fn extract_images(path: &Path) -> Result<ExtractedImages, DocMistralError> {
    let doc = Document::load(path).map_err(|e| DocMistralError::PdfParseFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(extract_from_document(&doc))
}

/// Extract images from an already-loaded document.
pub fn extract_from_document(doc: &Document) -> ExtractedImages {
    let mut out = ExtractedImages::default();

    for (page, page_id) in doc.get_pages() {
        let Some(xobjects) = page_xobjects(doc, page_id) else {
            continue;
        };

        for (key, obj) in xobjects.iter() {
            let name = String::from_utf8_lossy(key).into_owned();
            let Some(stream) = resolve(doc, obj).and_then(|o| o.as_stream().ok()) else {
                continue;
            };
            if !is_image(stream) {
                continue;
            }

            match decode_image(doc, stream) {
                Ok(image) => {
                    debug!(
                        "Page {}: extracted image {} ({}×{})",
                        page,
                        name,
                        image.width(),
                        image.height()
                    );
                    out.images.push(EmbeddedImage { page, name, image });
                }
                Err(DecodeError::ColorSpace(color_space)) => {
                    let w = ExtractionWarning::UnsupportedColorSpace {
                        page,
                        name,
                        color_space,
                    };
                    warn!("{}", w);
                    out.warnings.push(w);
                }
                Err(DecodeError::Unreadable(detail)) => {
                    let w = ExtractionWarning::UnreadableImage { page, name, detail };
                    warn!("{}", w);
                    out.warnings.push(w);
                }
            }
        }
    }

    out
}

enum DecodeError {
    ColorSpace(String),
    Unreadable(String),
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    dict.get(key)
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
}

fn name_of(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(n) => Some(n.as_slice()),
        _ => None,
    }
}

fn integer(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match dict.get(key).ok().and_then(|o| resolve(doc, o))? {
        Object::Integer(i) => Some(*i),
        Object::Real(r) => Some(*r as i64),
        _ => None,
    }
}

/// The `/XObject` dictionary in effect for a page.
fn page_xobjects(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(resources) = resolve_dict(doc, node, b"Resources") {
            return resolve_dict(doc, resources, b"XObject");
        }
        node = resolve_dict(doc, node, b"Parent")?;
    }
    None
}

fn is_image(stream: &Stream) -> bool {
    stream.dict.get(b"Subtype").ok().and_then(name_of) == Some(b"Image".as_slice())
}

fn filters(doc: &Document, dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::Name(n)) => vec![n.clone()],
        Some(Object::Array(items)) => items
            .iter()
            .filter_map(|o| name_of(o).map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Clone, Copy)]
enum Channels {
    Gray,
    Rgb,
}

fn channels(doc: &Document, dict: &Dictionary) -> Result<Channels, DecodeError> {
    let cs = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| resolve(doc, o))
        .ok_or_else(|| DecodeError::Unreadable("missing /ColorSpace".into()))?;

    match cs {
        Object::Name(n) => match n.as_slice() {
            b"DeviceRGB" | b"CalRGB" => Ok(Channels::Rgb),
            b"DeviceGray" | b"CalGray" => Ok(Channels::Gray),
            other => Err(DecodeError::ColorSpace(String::from_utf8_lossy(other).into_owned())),
        },
        Object::Array(items) => {
            let family = items.first().and_then(name_of).unwrap_or(b"?");
            match family {
                b"CalRGB" => Ok(Channels::Rgb),
                b"CalGray" => Ok(Channels::Gray),
                b"ICCBased" => {
                    let n = items
                        .get(1)
                        .and_then(|o| resolve(doc, o))
                        .and_then(|o| o.as_stream().ok())
                        .and_then(|s| integer(doc, &s.dict, b"N"));
                    match n {
                        Some(3) => Ok(Channels::Rgb),
                        Some(1) => Ok(Channels::Gray),
                        Some(n) => Err(DecodeError::ColorSpace(format!("ICCBased/{n}"))),
                        None => Err(DecodeError::ColorSpace("ICCBased".into())),
                    }
                }
                other => Err(DecodeError::ColorSpace(String::from_utf8_lossy(other).into_owned())),
            }
        }
        _ => Err(DecodeError::Unreadable("malformed /ColorSpace".into())),
    }
}

/// A positive `/Width` or `/Height` that fits in `u32`.
fn dimension(doc: &Document, dict: &Dictionary, key: &[u8]) -> Result<u32, DecodeError> {
    let label = String::from_utf8_lossy(key);
    let value = integer(doc, dict, key)
        .filter(|v| *v > 0)
        .ok_or_else(|| DecodeError::Unreadable(format!("missing /{label}")))?;
    u32::try_from(value).map_err(|_| DecodeError::Unreadable("image dimensions too large".into()))
}

fn decode_image(doc: &Document, stream: &Stream) -> Result<DynamicImage, DecodeError> {
    let filters = filters(doc, &stream.dict);

    if filters.iter().any(|f| f.as_slice() == b"DCTDecode") {
        if filters.len() != 1 {
            return Err(DecodeError::Unreadable("DCTDecode combined with other filters".into()));
        }
        return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map_err(|e| DecodeError::Unreadable(e.to_string()));
    }

    if let Some(f) = filters
        .iter()
        .find(|f| matches!(f.as_slice(), b"JPXDecode" | b"JBIG2Decode" | b"CCITTFaxDecode"))
    {
        return Err(DecodeError::Unreadable(format!(
            "unsupported filter {}",
            String::from_utf8_lossy(f)
        )));
    }

    let width = dimension(doc, &stream.dict, b"Width")?;
    let height = dimension(doc, &stream.dict, b"Height")?;
    let bpc = integer(doc, &stream.dict, b"BitsPerComponent").unwrap_or(8);
    if bpc != 8 {
        return Err(DecodeError::Unreadable(format!("{bpc} bits per component")));
    }

    let channels = channels(doc, &stream.dict)?;

    let mut samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| DecodeError::Unreadable(format!("decompression failed: {e}")))?
    };

    let per_pixel = match channels {
        Channels::Gray => 1,
        Channels::Rgb => 3,
    };
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(per_pixel))
        .ok_or_else(|| DecodeError::Unreadable("image dimensions too large".into()))?;
    if samples.len() < expected {
        return Err(DecodeError::Unreadable(format!(
            "{} bytes of samples, expected {expected}",
            samples.len()
        )));
    }
    samples.truncate(expected);

    let image = match channels {
        Channels::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        Channels::Gray => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
    };
    image.ok_or_else(|| DecodeError::Unreadable("sample buffer does not match dimensions".into()))
}
