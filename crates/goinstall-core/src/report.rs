//! Extraction reporting.

use std::path::Path;
use std::time::Duration;

/// Summary of a successful extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Entries read from the archive, skipped ones included.
    pub files_seen: usize,

    /// Sum of declared regular-file sizes.
    pub bytes_seen: u64,

    /// Directory entries materialized.
    pub directories_created: usize,

    /// Regular files written.
    pub files_extracted: usize,

    /// Symlinks created.
    pub symlinks_created: usize,

    /// Hardlinks created.
    pub hardlinks_created: usize,

    /// Entries of unsupported types (devices, FIFOs, ...) that were skipped.
    pub entries_skipped: usize,

    /// Wall-clock time of the extraction.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of filesystem nodes created.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.directories_created + self.files_extracted + self.symlinks_created + self.hardlinks_created
    }
}

/// Callback trait for progress reporting during extraction.
///
/// Tar is a sequential format, so the total number of entries is not known
/// up front; `current` counts entries read so far (1-indexed).
///
/// # Examples
///
/// ```
/// use goinstall_core::ProgressCallback;
/// use std::path::Path;
///
/// #[derive(Default)]
/// struct ByteCounter(u64);
///
/// impl ProgressCallback for ByteCounter {
///     fn on_entry_start(&mut self, _path: &Path, _current: usize) {}
///
///     fn on_bytes_written(&mut self, bytes: u64) {
///         self.0 += bytes;
///     }
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("{} bytes written", self.0);
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called after an entry passed validation, before it is materialized.
    fn on_entry_start(&mut self, path: &Path, current: usize);

    /// Called for every chunk of file data written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called once an entry has been materialized or skipped.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the last entry, only on success.
    fn on_complete(&mut self);
}

/// `ProgressCallback` that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
