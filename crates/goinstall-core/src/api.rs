//! High-level public API for validating and extracting Go release archives.

use std::path::Path;

use crate::ExtractionReport;
use crate::Extractor;
use crate::ExtractorConfig;
use crate::Result;

/// Checks that `archive_path` exists and is a regular file.
///
/// # Errors
///
/// Returns an error in phase `"validating archive"` if it does not.
///
/// # Examples
///
/// ```no_run
/// use goinstall_core::validate_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// validate_archive("go1.21.0.linux-amd64.tar.gz", "/usr/local")?;
/// # Ok(())
/// # }
/// ```
pub fn validate_archive<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, dest_dir: Q) -> Result<()> {
    Extractor::default().validate(archive_path.as_ref(), dest_dir.as_ref())
}

/// Extracts a gzip-compressed tar archive into `dest_dir`.
///
/// Runs the pre-flight validation first, then the full extraction with
/// the limits in `config`.
///
/// # Errors
///
/// Returns an error if:
/// - the archive does not exist or is not a regular file
/// - the archive is not valid gzip or tar data
/// - an entry violates a security rule or quota
/// - an I/O operation fails
///
/// # Panics
///
/// Panics if `config` is malformed (see [`ExtractorConfig::validate`]).
///
/// # Examples
///
/// ```no_run
/// use goinstall_core::{ExtractorConfig, extract_archive};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractorConfig::go_release();
/// let report = extract_archive("go1.21.0.linux-amd64.tar.gz", "/tmp/go-staging", &config)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    dest_dir: Q,
    config: &ExtractorConfig,
) -> Result<ExtractionReport> {
    let archive_path = archive_path.as_ref();
    let dest_dir = dest_dir.as_ref();

    let extractor = Extractor::new(config.clone());
    extractor.validate(archive_path, dest_dir)?;
    extractor.extract(archive_path, dest_dir)
}
