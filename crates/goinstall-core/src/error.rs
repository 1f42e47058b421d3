//! Error types for archive validation and extraction.
//!
//! Three error kinds are distinguished:
//!
//! - [`ValidationError`]: a pre-flight check on the archive file failed.
//! - [`SecurityError`]: an entry tried to escape the destination, reach a
//!   sensitive location, or exceed a quota.
//! - [`ExtractionError`]: the top-level error returned by the extractor,
//!   naming the [`Phase`] that failed and wrapping one of the above (or a raw
//!   I/O error) as its cause.
//!
//! Every `Display` implementation renders paths through [`sanitize_path`],
//! which keeps only the final path component. The full paths stay available
//! on the error values for programmatic inspection.

use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Renders a path as its final component only.
///
/// Used by every error message in this crate so that rendered errors do not
/// reveal the layout of the local filesystem.
///
/// # Examples
///
/// ```
/// use goinstall_core::error::sanitize_path;
/// use std::path::Path;
///
/// assert_eq!(sanitize_path(Path::new("/usr/local/go/bin/go")), "go");
/// assert_eq!(sanitize_path(Path::new("go1.21.0.tar.gz")), "go1.21.0.tar.gz");
/// assert_eq!(sanitize_path(Path::new("")), "<empty>");
/// ```
#[must_use]
pub fn sanitize_path(path: &Path) -> Cow<'_, str> {
    match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None if path.as_os_str().is_empty() => Cow::Borrowed("<empty>"),
        // `/`, `..` and friends have no file name; they reveal nothing.
        None => path.to_string_lossy(),
    }
}

/// Sanitizes a raw, attacker-controlled entry name.
///
/// Entry names may contain NUL bytes and backslashes, so they are escaped
/// before being split on `/`.
fn sanitize_raw(raw: &Path) -> String {
    let escaped = raw.to_string_lossy().escape_debug().to_string();
    escaped
        .rsplit('/')
        .find(|part| !part.is_empty())
        .map_or_else(|| sanitize_path(raw).into_owned(), str::to_owned)
}

/// A resource ceiling that an archive exceeded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaExceeded {
    /// More entries than `max_files`.
    #[error("file count {current} exceeds limit {max}")]
    FileCount {
        /// Entries seen so far, including the offending one.
        current: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A single regular file declared more than `max_file_size` bytes.
    #[error("file size {size} exceeds limit {max}")]
    FileSize {
        /// Declared size of the entry.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Cumulative declared sizes went past `max_total_size`.
    #[error("total size {current} exceeds limit {max}")]
    TotalSize {
        /// Running total including the offending entry.
        current: u64,
        /// Configured maximum.
        max: u64,
    },

    /// A running counter would have overflowed.
    #[error("integer overflow in quota tracking")]
    IntegerOverflow,
}

/// The rule that a [`SecurityError`] reports.
///
/// The string form returned by [`SecurityCheck::as_str`] is stable and is
/// what tests and log consumers should match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityCheck {
    /// Entry name or link target is an absolute path.
    AbsolutePath,
    /// Entry name or link target contains a `..` segment.
    PathTraversal,
    /// Entry name or link target contains a backslash.
    Backslash,
    /// Entry name or link target contains a NUL byte.
    NullByte,
    /// Entry name or link target is not valid UTF-8.
    InvalidEncoding,
    /// Joined path does not stay inside the destination.
    PathContainment,
    /// An existing path resolves (through symlinks) outside the destination,
    /// or could not be resolved.
    PathResolution,
    /// Link target lands in a protected system directory.
    SensitivePath,
    /// An existing symlink on the link's path could not be resolved.
    SymlinkChainValidation,
    /// An existing symlink on the link's path resolves outside the
    /// destination.
    SymlinkChainDestination,
    /// Too many entries.
    FileCountLimit,
    /// A single file is too large.
    FileSizeLimit,
    /// The archive as a whole is too large.
    TotalSizeLimit,
}

impl SecurityCheck {
    /// Returns the machine-stable tag for this check.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AbsolutePath => "absolute path prevention",
            Self::PathTraversal => "path traversal prevention",
            Self::Backslash => "backslash prevention",
            Self::NullByte => "null byte prevention",
            Self::InvalidEncoding => "utf-8 encoding check",
            Self::PathContainment => "path containment",
            Self::PathResolution => "path resolution",
            Self::SensitivePath => "sensitive path prevention",
            Self::SymlinkChainValidation => "symlink chain validation",
            Self::SymlinkChainDestination => "symlink chain destination check",
            Self::FileCountLimit => "file count limit",
            Self::FileSizeLimit => "file size limit",
            Self::TotalSizeLimit => "total size limit",
        }
    }

    /// Returns `true` for the resource-quota checks.
    #[must_use]
    pub const fn is_quota(self) -> bool {
        matches!(
            self,
            Self::FileCountLimit | Self::FileSizeLimit | Self::TotalSizeLimit
        )
    }
}

impl fmt::Display for SecurityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying reason for a [`SecurityError`].
#[derive(Error, Debug)]
pub enum SecurityCause {
    /// A quota ceiling was exceeded.
    #[error(transparent)]
    Quota(#[from] QuotaExceeded),

    /// A filesystem query failed while resolving a path.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The path resolved to a location outside the destination.
    #[error("resolves outside destination to {}", sanitize_path(.resolved))]
    Escapes {
        /// Where the path actually resolved to.
        resolved: PathBuf,
    },
}

/// A containment, traversal, sensitive-path, chain, or quota violation.
#[derive(Error, Debug)]
#[error("security violation ({validation}) for {}", sanitize_raw(.attempted_path))]
pub struct SecurityError {
    /// The offending path: a raw entry name, a link target, or a joined path.
    pub attempted_path: PathBuf,
    /// Which rule fired.
    pub validation: SecurityCheck,
    /// Optional underlying reason.
    #[source]
    pub cause: Option<SecurityCause>,
}

impl SecurityError {
    /// Creates a security error without an underlying cause.
    pub fn new(attempted_path: impl Into<PathBuf>, validation: SecurityCheck) -> Self {
        Self {
            attempted_path: attempted_path.into(),
            validation,
            cause: None,
        }
    }

    /// Creates a security error with an underlying cause.
    pub fn with_cause(
        attempted_path: impl Into<PathBuf>,
        validation: SecurityCheck,
        cause: impl Into<SecurityCause>,
    ) -> Self {
        Self {
            attempted_path: attempted_path.into(),
            validation,
            cause: Some(cause.into()),
        }
    }

    /// Returns the quota that was exceeded, if this is a quota violation.
    #[must_use]
    pub fn quota(&self) -> Option<&QuotaExceeded> {
        match &self.cause {
            Some(SecurityCause::Quota(quota)) => Some(quota),
            _ => None,
        }
    }
}

/// A pre-flight check on the archive file failed.
#[derive(Error, Debug)]
#[error("validation failed for {}: {criteria}", sanitize_path(.path))]
pub struct ValidationError {
    /// The path that failed validation.
    pub path: PathBuf,
    /// The criterion that was not met, e.g. `"archive must be a regular file"`.
    pub criteria: String,
    /// Underlying I/O error, if any.
    #[source]
    pub cause: Option<io::Error>,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(path: impl Into<PathBuf>, criteria: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            criteria: criteria.into(),
            cause: None,
        }
    }

    /// Attaches the I/O error that caused the failure.
    #[must_use]
    pub fn caused_by(mut self, cause: io::Error) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// The phase of validation or extraction during which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Pre-flight validation of the archive path.
    ValidatingArchive,
    /// Resolving the destination directory.
    PreparingDestination,
    /// Opening the archive file.
    OpeningArchive,
    /// Setting up the gzip decompressor.
    CreatingGzipReader,
    /// Reading the next tar header.
    ReadingHeader,
    /// The cancellation flag was raised.
    CheckingCancellation,
    /// Enforcing `max_files`.
    ValidatingFileCount,
    /// Enforcing `max_file_size`.
    ValidatingFileSize,
    /// Enforcing `max_total_size`.
    ValidatingTotalSize,
    /// Validating the entry name and its joined target path.
    ValidatingHeaderName,
    /// Materializing a directory entry.
    ExtractingDirectory,
    /// Materializing a regular file entry.
    ExtractingFile,
    /// Materializing a symlink entry.
    ExtractingSymlink,
    /// Materializing a hardlink entry.
    ExtractingHardlink,
}

impl Phase {
    /// Returns the phase description used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidatingArchive => "validating archive",
            Self::PreparingDestination => "preparing destination",
            Self::OpeningArchive => "opening archive file",
            Self::CreatingGzipReader => "creating gzip reader",
            Self::ReadingHeader => "reading tar header",
            Self::CheckingCancellation => "checking cancellation",
            Self::ValidatingFileCount => "validating file count",
            Self::ValidatingFileSize => "validating file size",
            Self::ValidatingTotalSize => "validating total size",
            Self::ValidatingHeaderName => "validating header name",
            Self::ExtractingDirectory => "extracting directory",
            Self::ExtractingFile => "extracting file",
            Self::ExtractingSymlink => "extracting symlink",
            Self::ExtractingHardlink => "extracting hardlink",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error wrapped by an [`ExtractionError`].
#[derive(Error, Debug)]
pub enum ExtractionCause {
    /// Pre-flight validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A security rule rejected an entry.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// A filesystem or decoding operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level error returned by [`Extractor`](crate::Extractor).
///
/// # Examples
///
/// ```
/// use goinstall_core::error::{ExtractionError, Phase, SecurityCheck, SecurityError};
///
/// let err = ExtractionError::new(
///     "/downloads/go1.21.0.linux-amd64.tar.gz",
///     "/usr/local",
///     Phase::ValidatingHeaderName,
///     SecurityError::new("../../etc/passwd", SecurityCheck::PathTraversal),
/// );
///
/// assert_eq!(err.phase(), Phase::ValidatingHeaderName);
/// assert!(err.is_security_violation());
/// let rendered = err.to_string();
/// assert!(rendered.contains("validating header name"));
/// assert!(!rendered.contains("/downloads"));
/// ```
#[derive(Error, Debug)]
#[error(
    "{context} failed for archive {} into {}: {cause}",
    sanitize_path(.archive_path),
    sanitize_path(.destination)
)]
pub struct ExtractionError {
    /// The archive being processed.
    pub archive_path: PathBuf,
    /// The destination directory as supplied by the caller.
    pub destination: PathBuf,
    /// The phase that failed.
    pub context: Phase,
    /// What went wrong.
    #[source]
    pub cause: ExtractionCause,
}

impl ExtractionError {
    /// Creates a new extraction error.
    pub fn new(
        archive_path: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        context: Phase,
        cause: impl Into<ExtractionCause>,
    ) -> Self {
        Self {
            archive_path: archive_path.into(),
            destination: destination.into(),
            context,
            cause: cause.into(),
        }
    }

    /// Returns the phase that failed.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.context
    }

    /// Returns the wrapped security error, if any.
    #[must_use]
    pub fn security_error(&self) -> Option<&SecurityError> {
        match &self.cause {
            ExtractionCause::Security(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the wrapped validation error, if any.
    #[must_use]
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match &self.cause {
            ExtractionCause::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the wrapped I/O error, if any.
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match &self.cause {
            ExtractionCause::Io(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the security rule that fired, if this is a security violation.
    #[must_use]
    pub fn security_check(&self) -> Option<SecurityCheck> {
        self.security_error().map(|err| err.validation)
    }

    /// Returns `true` if this error represents a security violation,
    /// quota violations included.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self.cause, ExtractionCause::Security(_))
    }
}
