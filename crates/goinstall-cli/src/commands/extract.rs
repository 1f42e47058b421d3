//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use goinstall_core::Extractor;
use goinstall_core::NoopProgress;
use std::env;
use tracing::info;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, silent: bool) -> Result<()> {
    let dest = match &args.dest {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let config = args
        .config()
        .map_err(|reason| anyhow!("invalid extraction limits: {reason}"))?;
    info!(
        max_files = config.max_files,
        max_file_size = config.max_file_size,
        max_total_size = config.max_total_size,
        "extraction limits"
    );

    let extractor = Extractor::new(config);
    add_archive_context(extractor.validate(&args.archive, &dest))?;

    // Spinner only when a human is watching stderr.
    let report = if !silent && CliProgress::should_show() {
        let mut progress = CliProgress::new("Extracting");
        add_archive_context(extractor.extract_with_progress(&args.archive, &dest, &mut progress))?
    } else {
        add_archive_context(extractor.extract_with_progress(&args.archive, &dest, &mut NoopProgress))?
    };

    formatter.format_extraction_result(&args.archive, &dest, &report)
}
