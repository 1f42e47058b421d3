//! Validate command implementation.

use crate::cli::ValidateArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use goinstall_core::validate_archive;
use std::path::Path;

pub fn execute(args: &ValidateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let dest = args.dest.as_deref().unwrap_or_else(|| Path::new("."));
    add_archive_context(validate_archive(&args.archive, dest))?;
    formatter.format_validation_result(&args.archive)
}
