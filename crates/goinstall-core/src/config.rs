//! Quota and buffer configuration for the extractor.

use std::path::PathBuf;

use crate::security::default_sensitive_dirs;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Extraction limits, fixed for the lifetime of an [`Extractor`].
///
/// Every limit is inclusive: an archive with exactly `max_files` entries is
/// accepted, one more is rejected.
///
/// # Examples
///
/// ```
/// use goinstall_core::ExtractorConfig;
///
/// // Secure defaults
/// let config = ExtractorConfig::default();
/// assert_eq!(config.max_files, 10_000);
///
/// // Sized for an official Go release archive
/// let release = ExtractorConfig::go_release();
/// assert!(release.max_files > config.max_files);
///
/// // Tightened for a sandboxed test run
/// let tight = ExtractorConfig {
///     max_files: 100,
///     max_total_size: 10 * 1024 * 1024,
///     ..ExtractorConfig::default()
/// };
/// assert!(tight.validate().is_ok());
/// ```
///
/// [`Extractor`]: crate::Extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Maximum number of entries of any type.
    pub max_files: usize,

    /// Maximum declared size of a single regular file in bytes.
    pub max_file_size: u64,

    /// Maximum sum of declared regular-file sizes in bytes.
    pub max_total_size: u64,

    /// Chunk size used when copying file contents.
    pub buffer_size: usize,

    /// Directories link targets may not point into. See
    /// [`DEFAULT_SENSITIVE_DIRS`](crate::security::DEFAULT_SENSITIVE_DIRS).
    pub sensitive_dirs: Vec<PathBuf>,
}

impl Default for ExtractorConfig {
    /// Default values:
    /// - `max_files`: 10,000
    /// - `max_file_size`: 512 MiB
    /// - `max_total_size`: 2 GiB
    /// - `buffer_size`: 32 KiB
    /// - `sensitive_dirs`: the built-in deny-list
    fn default() -> Self {
        Self {
            max_files: 10_000,
            max_file_size: 512 * MIB,
            max_total_size: 2 * GIB,
            buffer_size: 32 * 1024,
            sensitive_dirs: default_sensitive_dirs(),
        }
    }
}

impl ExtractorConfig {
    /// Limits sized for an official Go distribution archive, which holds
    /// roughly 15,000 entries.
    #[must_use]
    pub fn go_release() -> Self {
        Self {
            max_files: 25_000,
            max_file_size: GIB,
            max_total_size: 4 * GIB,
            ..Self::default()
        }
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than zero");
        }
        if self.max_files == 0 {
            return Err("max_files must be greater than zero");
        }
        Ok(())
    }
}
