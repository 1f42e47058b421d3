//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use goinstall_core::ExtractionReport;
use goinstall_core::extract_version;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn success_line(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn extraction_summary(&self, archive: &Path, dest: &Path, report: &ExtractionReport) -> Vec<String> {
        let version = extract_version(&archive.to_string_lossy());
        let mut lines = vec![
            format!("Extracted {version} into {}", dest.display()),
            format!("  Files:       {}", Self::format_number(report.files_extracted)),
            format!("  Directories: {}", Self::format_number(report.directories_created)),
            format!("  Total size:  {}", humanize_bytes(report.bytes_seen)),
        ];

        if self.verbose {
            lines.push(format!("  Entries:     {}", Self::format_number(report.files_seen)));
            lines.push(format!("  Symlinks:    {}", report.symlinks_created));
            lines.push(format!("  Hardlinks:   {}", report.hardlinks_created));
            lines.push(format!("  Skipped:     {}", report.entries_skipped));
            lines.push(format!("  Duration:    {:?}", report.duration));
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(
        &self,
        archive: &Path,
        dest: &Path,
        report: &ExtractionReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let lines = self.extraction_summary(archive, dest, report);
        if let Some((headline, details)) = lines.split_first() {
            self.success_line(headline);
            for line in details {
                self.term.write_line(line)?;
            }
        }

        Ok(())
    }

    fn format_validation_result(&self, archive: &Path) -> Result<()> {
        if !self.quiet {
            self.success_line(&format!("Archive OK: {}", archive.display()));
        }
        Ok(())
    }

    fn format_version(&self, _input: &str, version: &str, _is_semver: bool) -> Result<()> {
        // Printed even with --quiet: the version is the command's output.
        self.term.write_line(version)?;
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error}"));
        }
    }
}
