//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConverterConfigBuilder::progress_callback`] to receive
//! events as [`crate::batch::process_directory`] works through the input
//! tree.
//!
//! # Example
//!
//! ```rust
//! use docmistral::{BatchProgressCallback, ConverterConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, path: &Path, index: usize, total: usize, markdown_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} ({} bytes)", index, total, path.display(), markdown_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConverterConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::BatchTally;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch walker as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed one at a time, but the trait is
/// `Send + Sync` so a callback can be shared with other tasks.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the input tree has been enumerated.
    ///
    /// # Arguments
    /// * `total_files` — number of supported files that will be attempted
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is sent to the OCR service.
    ///
    /// # Arguments
    /// * `path`  — input file
    /// * `index` — 1-indexed position in the batch
    /// * `total` — total files in the batch
    fn on_file_start(&self, path: &Path, index: usize, total: usize) {
        let _ = (path, index, total);
    }

    /// Called when a file has been converted and written.
    ///
    /// `markdown_len` is the byte length of the written Markdown.
    fn on_file_complete(&self, path: &Path, index: usize, total: usize, markdown_len: usize) {
        let _ = (path, index, total, markdown_len);
    }

    /// Called when a file fails; the batch continues.
    fn on_file_error(&self, path: &Path, index: usize, total: usize, error: &str) {
        let _ = (path, index, total, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, tally: &BatchTally) {
        let _ = tally;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConverterConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        final_success: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.started_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _path: &Path, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _path: &Path, _index: usize, _total: usize, _len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _path: &Path, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, tally: &BatchTally) {
            self.final_success.store(tally.success, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(Path::new("a.pdf"), 1, 2);
        cb.on_file_complete(Path::new("a.pdf"), 1, 2, 42);
        cb.on_file_error(Path::new("b.png"), 2, 2, "boom");
        cb.on_batch_complete(&BatchTally { success: 1, failed: 1 });
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(3);
        tracker.on_file_start(Path::new("a.pdf"), 1, 3);
        tracker.on_file_complete(Path::new("a.pdf"), 1, 3, 10);
        tracker.on_file_start(Path::new("b.pdf"), 2, 3);
        tracker.on_file_error(Path::new("b.pdf"), 2, 3, "HTTP 500");
        tracker.on_file_start(Path::new("c.png"), 3, 3);
        tracker.on_file_complete(Path::new("c.png"), 3, 3, 0);
        tracker.on_batch_complete(&BatchTally { success: 2, failed: 1 });

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_success.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_file_complete(Path::new("x.jpg"), 1, 1, 5);
    }
}
