//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use goinstall_core::ExtractorConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "goinstall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a Go release archive
    Extract(ExtractArgs),
    /// Check that an archive exists and is a regular file
    Validate(ValidateArgs),
    /// Print the Go version encoded in an archive filename
    Version(VersionArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the .tar.gz archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Destination directory (default: current directory)
    #[arg(value_name = "DEST")]
    pub dest: Option<PathBuf>,

    /// Maximum number of entries to extract
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Maximum single file size (accepts K, M, G, T suffixes)
    #[arg(long, value_parser = parse_byte_size)]
    pub max_file_size: Option<u64>,

    /// Maximum total extracted size (accepts K, M, G, T suffixes)
    #[arg(long, value_parser = parse_byte_size)]
    pub max_total_size: Option<u64>,

    /// Copy buffer size (accepts K, M, G, T suffixes)
    #[arg(long, value_parser = parse_byte_size)]
    pub buffer_size: Option<u64>,
}

impl ExtractArgs {
    /// Builds the extractor configuration: the Go release profile with any
    /// limits given on the command line applied on top.
    pub fn config(&self) -> Result<ExtractorConfig, String> {
        let mut config = ExtractorConfig::go_release();

        if let Some(max_files) = self.max_files {
            config.max_files = max_files;
        }
        if let Some(max_file_size) = self.max_file_size {
            config.max_file_size = max_file_size;
        }
        if let Some(max_total_size) = self.max_total_size {
            config.max_total_size = max_total_size;
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = usize::try_from(buffer_size)
                .map_err(|_| format!("buffer size too large: {buffer_size}"))?;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the .tar.gz archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Destination directory the archive would be extracted into
    #[arg(value_name = "DEST")]
    pub dest: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct VersionArgs {
    /// Archive filename or path, e.g. go1.21.0.linux-amd64.tar.gz
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parses a byte size with an optional binary suffix (K, M, G, T).
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}
