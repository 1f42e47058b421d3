//! Materialization of validated entries.
//!
//! Nodes are created with a permissive mode and then tightened with
//! `chmod` to the header's permission bits.

use std::io::Write;
use std::path::Path;

use super::session::ExtractionSession;
use crate::codec::EntryCursor;
use crate::copy::copy_exact;
use crate::error::Phase;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::report::ProgressCallback;
use crate::security::validate_linkname;
use crate::types::ArchiveEntry;

const DIR_CREATE_MODE: u32 = 0o755;
const FILE_CREATE_MODE: u32 = 0o644;

impl<F: FileSystem + ?Sized> ExtractionSession<'_, F> {
    fn ensure_parent(&self, target: &Path, phase: Phase) -> Result<()> {
        match target.parent() {
            Some(parent) => self
                .fs
                .mkdir_all(parent, DIR_CREATE_MODE)
                .map_err(|e| self.error(phase, e)),
            None => Ok(()),
        }
    }

    pub(super) fn extract_directory(&mut self, target: &Path, entry: &ArchiveEntry) -> Result<()> {
        self.fs
            .mkdir_all(target, DIR_CREATE_MODE)
            .and_then(|()| self.fs.chmod(target, entry.permissions()))
            .map_err(|e| self.error(Phase::ExtractingDirectory, e))?;

        self.report.directories_created += 1;
        Ok(())
    }

    pub(super) fn extract_file<E: EntryCursor + ?Sized>(
        &mut self,
        target: &Path,
        entry: &ArchiveEntry,
        cursor: &mut E,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        self.ensure_parent(target, Phase::ExtractingFile)?;

        let mut out = self
            .fs
            .open_file(target, FILE_CREATE_MODE)
            .map_err(|e| self.error(Phase::ExtractingFile, e))?;

        let copied = copy_exact(cursor, &mut out, entry.size, &mut self.buffer, |n| {
            progress.on_bytes_written(n);
        })
        .and_then(|_| out.flush());
        drop(out);
        copied.map_err(|e| self.error(Phase::ExtractingFile, e))?;

        self.fs
            .chmod(target, entry.permissions())
            .map_err(|e| self.error(Phase::ExtractingFile, e))?;

        self.report.files_extracted += 1;
        Ok(())
    }

    pub(super) fn extract_symlink(&mut self, target: &Path, entry: &ArchiveEntry) -> Result<()> {
        let base_dir = target.parent().unwrap_or_else(|| self.dest.as_path());
        validate_linkname(
            &entry.linkname,
            base_dir,
            &self.dest,
            &self.config.sensitive_dirs,
            self.fs,
        )
        .map_err(|e| self.error(Phase::ExtractingSymlink, e))?;

        self.ensure_parent(target, Phase::ExtractingSymlink)?;
        self.fs
            .symlink(Path::new(&entry.linkname), target)
            .map_err(|e| self.error(Phase::ExtractingSymlink, e))?;

        self.report.symlinks_created += 1;
        Ok(())
    }

    /// Hardlink targets are named relative to the archive root, not to the
    /// directory containing the link.
    pub(super) fn extract_hardlink(&mut self, target: &Path, entry: &ArchiveEntry) -> Result<()> {
        let link_target = validate_linkname(
            &entry.linkname,
            self.dest.as_path(),
            &self.dest,
            &self.config.sensitive_dirs,
            self.fs,
        )
        .map_err(|e| self.error(Phase::ExtractingHardlink, e))?;

        self.ensure_parent(target, Phase::ExtractingHardlink)?;
        self.fs
            .link(&link_target, target)
            .map_err(|e| self.error(Phase::ExtractingHardlink, e))?;

        self.report.hardlinks_created += 1;
        Ok(())
    }
}
