//! Go release version parsing from archive filenames.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// A Go release version such as `go1.21.0`.
///
/// Ordering follows semantic versioning.
///
/// # Examples
///
/// ```
/// use goinstall_core::GoVersion;
///
/// let version: GoVersion = "go1.21.0".parse().unwrap();
/// assert_eq!(version.semver().minor, 21);
/// assert_eq!(version.to_string(), "go1.21.0");
///
/// let older = GoVersion::from_filename("go1.20.14.linux-amd64.tar.gz").unwrap();
/// assert!(older < version);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoVersion(semver::Version);

/// Error returned when a string is not a `go<major>.<minor>.<patch>`
/// version.
#[derive(Error, Debug)]
pub enum ParseGoVersionError {
    /// The string does not start with `go` followed by a digit.
    #[error("version must start with \"go\" followed by a digit")]
    MissingPrefix,

    /// The numeric part is not a semantic version.
    #[error("invalid version number: {0}")]
    Semver(#[from] semver::Error),
}

impl GoVersion {
    /// Parses the version out of a release archive filename or path.
    ///
    /// Returns `None` where [`extract_version`] would fall back to the
    /// filename.
    #[must_use]
    pub fn from_filename(filename_or_path: &str) -> Option<Self> {
        parse_stem(archive_stem(filename_or_path)).ok()
    }

    /// Returns the parsed semantic version.
    #[must_use]
    pub const fn semver(&self) -> &semver::Version {
        &self.0
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "go{}", self.0)
    }
}

impl FromStr for GoVersion {
    type Err = ParseGoVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_stem(s)
    }
}

/// Final path component with the `.tar.gz` suffix removed.
fn archive_stem(filename_or_path: &str) -> &str {
    let base = filename_or_path
        .rsplit('/')
        .find(|part| !part.is_empty())
        .unwrap_or("");
    base.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(base)
}

fn parse_stem(stem: &str) -> Result<GoVersion, ParseGoVersionError> {
    let rest = stem
        .strip_prefix("go")
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .ok_or(ParseGoVersionError::MissingPrefix)?;

    let release = rest.split('-').next().unwrap_or(rest);
    let numeric: Vec<&str> = release.split('.').take(3).collect();

    let version = semver::Version::parse(&numeric.join("."))?;
    Ok(GoVersion(version))
}

/// Best-effort Go version from a release archive filename or path.
///
/// Strips the directory and the `.tar.gz` suffix, requires a `go` prefix
/// followed by a digit, drops everything from the first `-`, keeps the
/// first three dot-separated components and checks they form a semantic
/// version. If any step fails the stripped filename is returned unchanged.
///
/// # Examples
///
/// ```
/// use goinstall_core::extract_version;
///
/// assert_eq!(extract_version("go1.21.0.linux-amd64.tar.gz"), "go1.21.0");
/// assert_eq!(extract_version("/a/b/go1.20.0.darwin-amd64.tar.gz"), "go1.20.0");
/// assert_eq!(extract_version("invalid-filename"), "invalid-filename");
/// assert_eq!(extract_version(""), "");
/// ```
#[must_use]
pub fn extract_version(filename_or_path: &str) -> String {
    let stem = archive_stem(filename_or_path);
    parse_stem(stem).map_or_else(|_| stem.to_owned(), |version| version.to_string())
}
