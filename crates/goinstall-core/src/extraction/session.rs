//! State owned by a single extraction call.

use std::io;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::codec::EntryCursor;
use crate::config::ExtractorConfig;
use crate::copy::CopyBuffer;
use crate::error::ExtractionCause;
use crate::error::ExtractionError;
use crate::error::Phase;
use crate::error::Result;
use crate::error::sanitize_path;
use crate::fs::FileSystem;
use crate::report::ExtractionReport;
use crate::report::ProgressCallback;
use crate::security::QuotaTracker;
use crate::security::resolve_and_validate_path;
use crate::security::validate_containment;
use crate::security::validate_encoding;
use crate::security::validate_header_name;
use crate::types::ArchiveEntry;
use crate::types::DestDir;
use crate::types::EntryType;

/// Running state of one `extract` call.
///
/// The destination is computed once in [`ExtractionSession::new`] and never
/// recomputed; counters live here rather than on the extractor so
/// concurrent calls share nothing.
pub(crate) struct ExtractionSession<'x, F: FileSystem + ?Sized> {
    pub(super) archive_path: &'x Path,
    pub(super) destination: &'x Path,
    pub(super) dest: DestDir,
    pub(super) config: &'x ExtractorConfig,
    pub(super) fs: &'x F,
    pub(super) buffer: CopyBuffer,
    pub(super) report: ExtractionReport,
    quota: QuotaTracker,
    started: Instant,
}

impl<'x, F: FileSystem + ?Sized> ExtractionSession<'x, F> {
    pub(crate) fn new(
        archive_path: &'x Path,
        destination: &'x Path,
        config: &'x ExtractorConfig,
        fs: &'x F,
        started: Instant,
    ) -> Result<Self> {
        let dest = DestDir::new(destination, fs).map_err(|e| {
            ExtractionError::new(archive_path, destination, Phase::PreparingDestination, e)
        })?;

        Ok(Self {
            archive_path,
            destination,
            dest,
            config,
            fs,
            buffer: CopyBuffer::with_capacity(config.buffer_size),
            report: ExtractionReport::new(),
            quota: QuotaTracker::new(),
            started,
        })
    }

    /// Wraps `cause` into an [`ExtractionError`] for this session and logs
    /// the rejection.
    pub(super) fn error(&self, phase: Phase, cause: impl Into<ExtractionCause>) -> ExtractionError {
        let err = ExtractionError::new(self.archive_path, self.destination, phase, cause);
        match err.security_error() {
            Some(security) => warn!(
                phase = %phase,
                check = %security.validation,
                path = %sanitize_path(&security.attempted_path),
                "rejected archive entry"
            ),
            None => warn!(phase = %phase, error = %err, "extraction failed"),
        }
        err
    }

    /// Drives `cursor` to the end of the archive.
    pub(crate) fn run<E: EntryCursor + ?Sized>(
        mut self,
        cursor: &mut E,
        cancel: Option<&AtomicBool>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        info!(
            archive = %sanitize_path(self.archive_path),
            destination = %self.dest.as_path().display(),
            "extracting archive"
        );

        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(self.error(
                    Phase::CheckingCancellation,
                    io::Error::new(io::ErrorKind::Interrupted, "extraction cancelled"),
                ));
            }

            let entry = match cursor.next_entry() {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(self.error(Phase::ReadingHeader, e)),
            };

            self.process(&entry, cursor, progress)?;
        }

        self.report.files_seen = self.quota.files_seen();
        self.report.bytes_seen = self.quota.bytes_seen();
        self.report.duration = self.started.elapsed();

        info!(
            entries = self.report.files_seen,
            files = self.report.files_extracted,
            directories = self.report.directories_created,
            symlinks = self.report.symlinks_created,
            hardlinks = self.report.hardlinks_created,
            skipped = self.report.entries_skipped,
            "extraction complete"
        );
        progress.on_complete();

        Ok(self.report)
    }

    fn enforce_quota(&mut self, entry: &ArchiveEntry) -> Result<()> {
        let checked = self.quota.record_entry(&entry.name, self.config);
        checked.map_err(|e| self.error(Phase::ValidatingFileCount, e))?;

        if entry.entry_type.is_regular_file() {
            let checked = self.quota.check_file_size(&entry.name, entry.size, self.config);
            checked.map_err(|e| self.error(Phase::ValidatingFileSize, e))?;

            let checked = self.quota.record_bytes(&entry.name, entry.size, self.config);
            checked.map_err(|e| self.error(Phase::ValidatingTotalSize, e))?;
        }
        Ok(())
    }

    fn process<E: EntryCursor + ?Sized>(
        &mut self,
        entry: &ArchiveEntry,
        cursor: &mut E,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        self.enforce_quota(entry)?;

        validate_header_name(&entry.name)
            .and_then(|()| validate_encoding(entry))
            .map_err(|e| self.error(Phase::ValidatingHeaderName, e))?;

        let target = self.dest.join_entry(&entry.name);
        validate_containment(&target, self.dest.as_path())
            .and_then(|()| resolve_and_validate_path(&target, &self.dest, self.fs))
            .map_err(|e| self.error(Phase::ValidatingHeaderName, e))?;

        debug!(
            name = %entry.name,
            kind = entry.entry_type.name(),
            size = entry.size,
            "extracting entry"
        );
        let name = Path::new(&entry.name);
        progress.on_entry_start(name, self.quota.files_seen());

        match entry.entry_type {
            EntryType::Directory => self.extract_directory(&target, entry)?,
            EntryType::RegularFile => self.extract_file(&target, entry, cursor, progress)?,
            EntryType::Symlink => self.extract_symlink(&target, entry)?,
            EntryType::HardLink => self.extract_hardlink(&target, entry)?,
            EntryType::Other(type_flag) => {
                warn!(
                    path = %sanitize_path(name),
                    type_flag = %char::from(type_flag).escape_default(),
                    "skipping unsupported entry type"
                );
                self.report.entries_skipped += 1;
            }
        }

        progress.on_entry_complete(name);
        Ok(())
    }
}
