//! goinstall CLI - hardened extraction of Go toolchain release archives.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::cli::Commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    if let Err(err) = logging::init(cli.verbose, cli.quiet) {
        formatter.format_error(&err);
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Commands::Extract(args) => commands::extract::execute(args, &*formatter, cli.quiet || cli.json),
        Commands::Validate(args) => commands::validate::execute(args, &*formatter),
        Commands::Version(args) => commands::version::execute(args, &*formatter),
        Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}
