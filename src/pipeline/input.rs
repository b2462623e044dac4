//! Input loading: turn a path into a [`ConversionRequest`], or stage
//! in-memory bytes into a temporary file.
//!
//! Staged files live in a [`NamedTempFile`] owned by [`StagedInput`], so
//! they are removed when the guard is dropped, whichever way the conversion
//! ends.

use crate::error::DocMistralError;
use crate::format::{self, FileKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Everything needed to build one OCR request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub kind: FileKind,
    /// Lower-cased extension without the dot.
    pub extension: String,
}

/// Read `path` fully after checking its extension, existence and size.
pub async fn load_request(path: &Path, max_bytes: u64) -> Result<ConversionRequest, DocMistralError> {
    let kind = format::classify(path);
    let extension = match (kind, format::extension_of(path)) {
        (FileKind::Unsupported, _) | (_, None) => {
            return Err(DocMistralError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: format::display_extension(path),
            })
        }
        (_, Some(ext)) => ext,
    };

    let meta = tokio::fs::metadata(path).await.map_err(|e| io_error(path, e))?;
    if !meta.is_file() {
        return Err(DocMistralError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if meta.len() > max_bytes {
        return Err(DocMistralError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    debug!("Read {} ({} bytes, {:?})", path.display(), bytes.len(), kind);

    Ok(ConversionRequest {
        path: path.to_path_buf(),
        bytes,
        kind,
        extension,
    })
}

fn io_error(path: &Path, e: std::io::Error) -> DocMistralError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DocMistralError::InputNotFound {
            path: path.to_path_buf(),
        }
    } else {
        DocMistralError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Bytes written to a temporary file that is deleted on drop.
#[derive(Debug)]
pub struct StagedInput {
    file: NamedTempFile,
}

impl StagedInput {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write `bytes` to a temporary file whose suffix is `extension`, so
/// classification of the staged path matches the declared file.
pub fn stage_bytes(
    extension: &str,
    bytes: &[u8],
    dir: Option<&Path>,
) -> Result<StagedInput, DocMistralError> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut builder = tempfile::Builder::new();
    builder.prefix("docmistral-").suffix(&suffix);

    let mut file = match dir {
        Some(d) => builder.tempfile_in(d),
        None => builder.tempfile(),
    }
    .map_err(|e| DocMistralError::Internal(format!("tempfile: {e}")))?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| DocMistralError::Internal(format!("tempfile write: {e}")))?;

    debug!("Staged {} bytes at {}", bytes.len(), file.path().display());
    Ok(StagedInput { file })
}
