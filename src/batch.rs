//! Directory mirroring: convert every supported file under an input tree into
//! a `.md` file at the same relative location under an output tree.
//!
//! Files are converted one after another. A failing file is counted and the
//! walk continues; unsupported files are ignored entirely.

use crate::convert::Converter;
use crate::error::DocMistralError;
use crate::format;
use crate::output::BatchTally;
use crate::progress::{BatchProgressCallback, NoopProgressCallback};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Map `file` (somewhere under `input_root`) to its Markdown twin under
/// `output_root`: same relative directories, extension replaced by `md`.
///
/// A `file` outside `input_root` keeps only its file name.
pub fn mirrored_output_path(input_root: &Path, output_root: &Path, file: &Path) -> PathBuf {
    let relative = match file.strip_prefix(input_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => PathBuf::from(file.file_name().unwrap_or(file.as_os_str())),
    };
    output_root.join(relative).with_extension("md")
}

/// Recursively list supported files under `root`, sorted per directory.
///
/// Symlinked directories are not descended; symlinks to files are followed.
pub fn collect_supported_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, &mut found)?;
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, found)?;
        } else if file_type.is_symlink() {
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() && format::is_supported(&path) => found.push(path),
                Ok(_) => debug!("Not following symlink {}", path.display()),
                Err(e) => warn!("Dangling symlink {}: {}", path.display(), e),
            }
        } else if file_type.is_file() && format::is_supported(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Convert every supported file under `input_root` into `output_root`.
///
/// # Errors
/// - [`DocMistralError::InputNotFound`] if `input_root` does not exist
/// - [`DocMistralError::NotADirectory`] if it is not a directory
/// - [`DocMistralError::ReadFailed`] if the tree cannot be listed
///
/// Per-file failures never abort the run; they are counted in the tally.
pub async fn process_directory(
    converter: &Converter,
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
) -> Result<BatchTally, DocMistralError> {
    let input_root = input_root.as_ref().to_path_buf();
    let output_root = output_root.as_ref();

    let meta = tokio::fs::metadata(&input_root)
        .await
        .map_err(|_| DocMistralError::InputNotFound {
            path: input_root.clone(),
        })?;
    if !meta.is_dir() {
        return Err(DocMistralError::NotADirectory { path: input_root });
    }

    let walk_root = input_root.clone();
    let files = tokio::task::spawn_blocking(move || collect_supported_files(&walk_root))
        .await
        .map_err(|e| DocMistralError::Internal(format!("Directory walk panicked: {e}")))?
        .map_err(|source| DocMistralError::ReadFailed {
            path: input_root.clone(),
            source,
        })?;

    let progress: Arc<dyn BatchProgressCallback> = converter
        .config()
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));

    let total = files.len();
    info!("Found {} supported files under {}", total, input_root.display());
    progress.on_batch_start(total);

    let mut tally = BatchTally::default();
    for (i, file) in files.iter().enumerate() {
        let index = i + 1;
        let output = mirrored_output_path(&input_root, output_root, file);
        progress.on_file_start(file, index, total);

        let result = converter.convert_file(file, &output).await;
        tally.record(&result);

        match result.error {
            None => progress.on_file_complete(file, index, total, result.markdown.len()),
            Some(ref e) => progress.on_file_error(file, index, total, e),
        }
    }

    info!(
        "Batch finished: {} succeeded, {} failed",
        tally.success, tally.failed
    );
    progress.on_batch_complete(&tally);
    Ok(tally)
}
