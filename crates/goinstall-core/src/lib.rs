//! Hardened extraction of Go toolchain release archives.
//!
//! `goinstall-core` unpacks an untrusted `.tar.gz` Go distribution onto the
//! local filesystem without letting the archive escape its destination
//! directory, overwrite system files, or exhaust disk and inode resources.
//! It defends against:
//!
//! - absolute entry names and `..` traversal
//! - symlink and hardlink redirection, including two-hop chains through
//!   links planted by earlier entries
//! - links into sensitive system directories
//! - archive bombs, through file count and declared-size quotas
//!
//! # Examples
//!
//! ```no_run
//! use goinstall_core::{ExtractorConfig, extract_archive, extract_version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = "go1.21.0.linux-amd64.tar.gz";
//! let report = extract_archive(archive, "/tmp/go-staging", &ExtractorConfig::go_release())?;
//! println!("{}: {} files", extract_version(archive), report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod codec;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod fs;
pub mod report;
pub mod security;
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
pub mod types;
pub mod version;

pub use api::extract_archive;
pub use api::validate_archive;
pub use config::ExtractorConfig;
pub use error::ExtractionError;
pub use error::Result;
pub use error::SecurityCheck;
pub use error::SecurityError;
pub use error::ValidationError;
pub use extraction::Extractor;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use version::GoVersion;
pub use version::extract_version;

pub use types::ArchiveEntry;
pub use types::DestDir;
pub use types::EntryType;
