//! Extraction quota tracking and validation.
//!
//! Quotas are enforced against header-declared sizes before any byte of an
//! entry is written, so an archive that would blow past a limit is stopped
//! without producing a partial oversized file.

use crate::config::ExtractorConfig;
use crate::error::QuotaExceeded;
use crate::error::SecurityCheck;
use crate::error::SecurityError;

/// Running totals for one extraction session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuotaTracker {
    files_seen: usize,
    bytes_seen: u64,
}

impl QuotaTracker {
    /// Creates a tracker with both counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more entry of any type against `max_files`.
    ///
    /// # Errors
    ///
    /// Returns a [`SecurityCheck::FileCountLimit`] error once the count
    /// exceeds the limit.
    pub fn record_entry(&mut self, name: &str, config: &ExtractorConfig) -> Result<(), SecurityError> {
        self.files_seen = self.files_seen.checked_add(1).ok_or_else(|| {
            SecurityError::with_cause(
                name,
                SecurityCheck::FileCountLimit,
                QuotaExceeded::IntegerOverflow,
            )
        })?;

        if self.files_seen > config.max_files {
            return Err(SecurityError::with_cause(
                name,
                SecurityCheck::FileCountLimit,
                QuotaExceeded::FileCount {
                    current: self.files_seen,
                    max: config.max_files,
                },
            ));
        }
        Ok(())
    }

    /// Checks a regular file's declared size against the per-file limit.
    ///
    /// # Errors
    ///
    /// Returns a [`SecurityCheck::FileSizeLimit`] error if `size` exceeds
    /// `max_file_size`.
    pub fn check_file_size(
        &self,
        name: &str,
        size: u64,
        config: &ExtractorConfig,
    ) -> Result<(), SecurityError> {
        if size > config.max_file_size {
            return Err(SecurityError::with_cause(
                name,
                SecurityCheck::FileSizeLimit,
                QuotaExceeded::FileSize {
                    size,
                    max: config.max_file_size,
                },
            ));
        }
        Ok(())
    }

    /// Adds a regular file's declared size to the running total.
    ///
    /// # Errors
    ///
    /// Returns a [`SecurityCheck::TotalSizeLimit`] error if the total would
    /// exceed `max_total_size` or overflow.
    pub fn record_bytes(
        &mut self,
        name: &str,
        size: u64,
        config: &ExtractorConfig,
    ) -> Result<(), SecurityError> {
        let total = self.bytes_seen.checked_add(size).ok_or_else(|| {
            SecurityError::with_cause(
                name,
                SecurityCheck::TotalSizeLimit,
                QuotaExceeded::IntegerOverflow,
            )
        })?;

        if total > config.max_total_size {
            return Err(SecurityError::with_cause(
                name,
                SecurityCheck::TotalSizeLimit,
                QuotaExceeded::TotalSize {
                    current: total,
                    max: config.max_total_size,
                },
            ));
        }

        self.bytes_seen = total;
        Ok(())
    }

    /// Entries counted so far, including rejected and skipped ones.
    #[must_use]
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    /// Sum of declared regular-file sizes accepted so far.
    #[must_use]
    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }
}
