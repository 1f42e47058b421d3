//! Core extraction engine.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use super::session::ExtractionSession;
use crate::codec::Codec;
use crate::codec::EntryCursor;
use crate::codec::GzipCodec;
use crate::codec::TarCursor;
use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::error::Phase;
use crate::error::Result;
use crate::error::ValidationError;
use crate::fs::FileSystem;
use crate::fs::OsFileSystem;
use crate::report::ExtractionReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;

/// Hardened extractor for gzip-compressed tar archives.
///
/// Every entry passes the path validator before anything touches the
/// filesystem. Extraction is not transactional: if an entry fails, the
/// entries written before it stay on disk. Extract into a fresh directory
/// and move it into place on success when that matters.
///
/// The filesystem and codec are type parameters so tests can substitute
/// recording or scripted implementations.
///
/// # Examples
///
/// ```no_run
/// use goinstall_core::{Extractor, ExtractorConfig};
/// use std::path::Path;
///
/// # fn main() -> Result<(), goinstall_core::ExtractionError> {
/// let extractor = Extractor::new(ExtractorConfig::go_release());
/// let archive = Path::new("go1.21.0.linux-amd64.tar.gz");
/// let dest = Path::new("/tmp/go-staging");
///
/// extractor.validate(archive, dest)?;
/// let report = extractor.extract(archive, dest)?;
/// println!("extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Extractor<F = OsFileSystem, C = GzipCodec> {
    config: ExtractorConfig,
    fs: F,
    codec: C,
    cancel: Option<Arc<AtomicBool>>,
}

impl Extractor {
    /// Creates an extractor on the host filesystem with gzip decoding.
    ///
    /// # Panics
    ///
    /// Panics if `config` is malformed (see [`ExtractorConfig::validate`]).
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_parts(config, OsFileSystem, GzipCodec)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl<F: FileSystem, C: Codec> Extractor<F, C> {
    /// Creates an extractor over the given filesystem and codec.
    ///
    /// # Panics
    ///
    /// Panics if `config` is malformed (see [`ExtractorConfig::validate`]).
    pub fn with_parts(config: ExtractorConfig, fs: F, codec: C) -> Self {
        if let Err(reason) = config.validate() {
            panic!("invalid extractor configuration: {reason}");
        }

        Self {
            config,
            fs,
            codec,
            cancel: None,
        }
    }

    /// Installs a cancellation flag, checked before each entry header is
    /// read. An entry that is already being written is finished first.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Returns the filesystem the extractor operates on.
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Pre-flight check: `archive_path` must exist and be a regular file.
    ///
    /// Does not open or decode the archive and has no side effects.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] in phase
    /// [`Phase::ValidatingArchive`] wrapping a [`ValidationError`].
    pub fn validate(&self, archive_path: &Path, dest_dir: &Path) -> Result<()> {
        let fail = |err: ValidationError| {
            ExtractionError::new(archive_path, dest_dir, Phase::ValidatingArchive, err)
        };

        let info = self.fs.stat(archive_path).map_err(|e| {
            let criteria = if e.kind() == io::ErrorKind::NotFound {
                "archive file must exist"
            } else {
                "archive file must be accessible"
            };
            fail(ValidationError::new(archive_path, criteria).caused_by(e))
        })?;

        if !info.is_file() {
            return Err(fail(ValidationError::new(
                archive_path,
                "archive must be a regular file",
            )));
        }
        Ok(())
    }

    /// Extracts `archive_path` into `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] naming the failed phase. Security
    /// violations, quota violations included, wrap a
    /// [`SecurityError`](crate::error::SecurityError).
    pub fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<ExtractionReport> {
        self.extract_with_progress(archive_path, dest_dir, &mut NoopProgress)
    }

    /// Like [`extract`](Self::extract), reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract).
    pub fn extract_with_progress(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let started = Instant::now();
        let fail = |phase, e: io::Error| ExtractionError::new(archive_path, dest_dir, phase, e);

        let file = self
            .fs
            .open(archive_path)
            .map_err(|e| fail(Phase::OpeningArchive, e))?;
        let decoded = self
            .codec
            .decompress(file)
            .map_err(|e| fail(Phase::CreatingGzipReader, e))?;

        let mut archive = tar::Archive::new(decoded);
        let mut cursor = TarCursor::new(&mut archive).map_err(|e| fail(Phase::ReadingHeader, e))?;

        let session = ExtractionSession::new(archive_path, dest_dir, &self.config, &self.fs, started)?;
        session.run(&mut cursor, self.cancel.as_deref(), progress)
    }

    /// Runs the extraction loop over an already-open entry cursor.
    ///
    /// `archive_path` is only used to label errors.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract).
    pub fn extract_from_cursor<E: EntryCursor + ?Sized>(
        &self,
        cursor: &mut E,
        archive_path: &Path,
        dest_dir: &Path,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let session =
            ExtractionSession::new(archive_path, dest_dir, &self.config, &self.fs, Instant::now())?;
        session.run(cursor, self.cancel.as_deref(), progress)
    }
}
