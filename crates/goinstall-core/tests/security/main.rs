//! Attack-scenario tests: hostile archives against a real filesystem.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod archive_bomb;
mod hardlink_attack;
mod path_traversal;
mod symlink_escape;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use goinstall_core::error::Phase;
use goinstall_core::test_utils::write_archive;
use goinstall_core::ExtractionError;
use goinstall_core::ExtractionReport;
use goinstall_core::Extractor;
use goinstall_core::ExtractorConfig;
use goinstall_core::SecurityCheck;
use tempfile::TempDir;

/// A scratch area with a destination directory and a sibling directory
/// that plays the part of "somewhere outside".
pub struct Sandbox {
    pub temp: TempDir,
    pub dest: PathBuf,
    pub outside: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = temp.path().join("dest");
        let outside = temp.path().join("outside");
        fs::create_dir_all(&dest).unwrap();
        fs::create_dir_all(&outside).unwrap();
        Self {
            temp,
            dest,
            outside,
        }
    }

    pub fn extract(&self, data: &[u8]) -> goinstall_core::Result<ExtractionReport> {
        self.extract_with(ExtractorConfig::default(), data)
    }

    pub fn extract_with(
        &self,
        config: ExtractorConfig,
        data: &[u8],
    ) -> goinstall_core::Result<ExtractionReport> {
        let archive = write_archive(self.temp.path(), "hostile.tar.gz", data);
        Extractor::new(config).extract(&archive, &self.dest)
    }

    /// Number of entries directly inside `dir`.
    pub fn count(dir: &Path) -> usize {
        fs::read_dir(dir).map_or(0, Iterator::count)
    }

    pub fn outside_is_empty(&self) -> bool {
        Self::count(&self.outside) == 0
    }
}

/// Asserts that `result` failed on `check` during `phase`.
#[track_caller]
pub fn assert_rejected(
    result: goinstall_core::Result<ExtractionReport>,
    check: SecurityCheck,
    phase: Phase,
) -> ExtractionError {
    let err = result.expect_err("hostile archive must be rejected");
    assert_eq!(err.security_check(), Some(check), "unexpected error: {err}");
    assert_eq!(err.phase(), phase);
    err
}
