//! Error conversion utilities for CLI.
//!
//! Converts goinstall-core's typed errors (thiserror) into user-facing
//! errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use goinstall_core::ExtractionError;
use goinstall_core::SecurityCheck;
use goinstall_core::error::Phase;

const UNTRUSTED: &str = "This archive may be malicious. Only install Go from https://go.dev/dl/.";
const EXISTING_LINK: &str =
    "The destination already contains a symlink that leads elsewhere. Extract into an empty directory.";

fn security_hint(check: SecurityCheck) -> &'static str {
    match check {
        SecurityCheck::AbsolutePath
        | SecurityCheck::PathTraversal
        | SecurityCheck::Backslash
        | SecurityCheck::NullByte
        | SecurityCheck::InvalidEncoding
        | SecurityCheck::PathContainment => UNTRUSTED,
        SecurityCheck::SensitivePath => {
            "A link in this archive targets a protected system directory. Do not install it."
        }
        SecurityCheck::PathResolution
        | SecurityCheck::SymlinkChainValidation
        | SecurityCheck::SymlinkChainDestination => EXISTING_LINK,
        SecurityCheck::FileCountLimit => {
            "Use --max-files to raise the limit if the archive comes from a trusted source."
        }
        SecurityCheck::FileSizeLimit => {
            "Use --max-file-size to raise the limit if the archive comes from a trusted source."
        }
        SecurityCheck::TotalSizeLimit => {
            "Use --max-total-size to raise the limit if the archive comes from a trusted source."
        }
    }
}

fn phase_hint(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::ValidatingArchive | Phase::OpeningArchive => {
            Some("Check that the archive path is correct and readable.")
        }
        Phase::CreatingGzipReader | Phase::ReadingHeader => {
            Some("The archive is corrupt or not a .tar.gz file. Download it again.")
        }
        Phase::PreparingDestination => Some("Check that the destination path is usable."),
        _ => None,
    }
}

/// Converts an `ExtractionError` to an anyhow error carrying a `HINT:` line
/// where one applies.
pub fn convert_extraction_error(err: ExtractionError) -> anyhow::Error {
    let hint = err
        .security_check()
        .map(security_hint)
        .or_else(|| phase_hint(err.phase()));

    match hint {
        Some(hint) => anyhow!("{err}\nHINT: {hint}"),
        None => anyhow::Error::new(err),
    }
}

/// Maps the error of a core result through [`convert_extraction_error`].
pub fn add_archive_context<T>(result: Result<T, ExtractionError>) -> anyhow::Result<T> {
    result.map_err(convert_extraction_error)
}
