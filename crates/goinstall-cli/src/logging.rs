//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Level used when `RUST_LOG` is not set.
fn default_level(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Installs the global subscriber. Events go to stderr so `--json` output
/// on stdout stays machine-readable.
pub fn init(verbose: bool, quiet: bool) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, quiet).into())
        .from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish()
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), LevelFilter::WARN);
        assert_eq!(default_level(true, false), LevelFilter::INFO);
        assert_eq!(default_level(false, true), LevelFilter::ERROR);
    }
}
