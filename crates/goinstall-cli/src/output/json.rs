//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use goinstall_core::ExtractionReport;
use goinstall_core::extract_version;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    archive: String,
    destination: String,
    version: String,
    entries: usize,
    files_extracted: usize,
    directories_created: usize,
    symlinks_created: usize,
    hardlinks_created: usize,
    entries_skipped: usize,
    bytes_extracted: u64,
    duration_ms: u128,
}

impl ExtractionOutput {
    fn new(archive: &Path, dest: &Path, report: &ExtractionReport) -> Self {
        Self {
            archive: archive.display().to_string(),
            destination: dest.display().to_string(),
            version: extract_version(&archive.to_string_lossy()),
            entries: report.files_seen,
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            hardlinks_created: report.hardlinks_created,
            entries_skipped: report.entries_skipped,
            bytes_extracted: report.bytes_seen,
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(
        &self,
        archive: &Path,
        dest: &Path,
        report: &ExtractionReport,
    ) -> Result<()> {
        let output = JsonOutput::success("extract", ExtractionOutput::new(archive, dest, report));
        Self::output(&output)
    }

    fn format_validation_result(&self, archive: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct ValidationOutput {
            archive: String,
            valid: bool,
        }

        let data = ValidationOutput {
            archive: archive.display().to_string(),
            valid: true,
        };
        Self::output(&JsonOutput::success("validate", data))
    }

    fn format_version(&self, input: &str, version: &str, is_semver: bool) -> Result<()> {
        #[derive(Serialize)]
        struct VersionOutput<'a> {
            input: &'a str,
            version: &'a str,
            semver: bool,
        }

        let data = VersionOutput {
            input,
            version,
            semver: is_semver,
        };
        Self::output(&JsonOutput::success("version", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("error", error.to_string());
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_extraction_output_structure() {
        let report = ExtractionReport {
            files_seen: 3,
            bytes_seen: 42,
            files_extracted: 2,
            directories_created: 1,
            duration: Duration::from_millis(7),
            ..ExtractionReport::default()
        };
        let data = ExtractionOutput::new(
            Path::new("/dl/go1.21.0.linux-amd64.tar.gz"),
            Path::new("/opt"),
            &report,
        );

        let json = serde_json::to_value(JsonOutput::success("extract", data)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["version"], "go1.21.0");
        assert_eq!(json["data"]["entries"], 3);
        assert_eq!(json["data"]["bytes_extracted"], 42);
        assert_eq!(json["data"]["duration_ms"], 7);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_output_structure() {
        let json = serde_json::to_value(JsonOutput::error("error", "boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
