//! Version command implementation.

use crate::cli::VersionArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use goinstall_core::GoVersion;
use goinstall_core::extract_version;

/// Prints the best-effort version; never fails on unparseable names, the
/// stripped filename is printed instead.
pub fn execute(args: &VersionArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let version = extract_version(&args.archive);
    let is_semver = GoVersion::from_filename(&args.archive).is_some();
    formatter.format_version(&args.archive, &version, is_semver)
}
