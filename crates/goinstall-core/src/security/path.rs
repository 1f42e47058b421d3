//! Path validation for archive entry names and link targets.
//!
//! The checks here decide whether an entry may be materialized. They never
//! rewrite a hostile path into a "safer" one: every failure is reported as a
//! [`SecurityError`] naming the rule that fired.
//!
//! Raw names are checked in a fixed order so the reported rule is
//! deterministic for names that break several rules at once:
//!
//! 1. absolute path
//! 2. `..` segment
//! 3. backslash
//! 4. NUL byte
//!
//! Header fields that were not valid UTF-8 are rejected by
//! [`validate_encoding`] right after the name checks.

use std::ffi::OsString;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::error::SecurityCause;
use crate::error::SecurityCheck;
use crate::error::SecurityError;
use crate::fs::FileSystem;
use crate::types::ArchiveEntry;
use crate::types::DestDir;
use crate::types::HeaderField;

/// System directories that link targets must never land in.
///
/// A root is only enforced when the destination itself is not inside it:
/// extracting into `/usr/local/go` is an explicit choice, whereas a
/// destination under `/tmp` that symlinks into `/etc` is not.
pub const DEFAULT_SENSITIVE_DIRS: &[&str] = &[
    "/etc", "/usr", "/bin", "/sbin", "/lib", "/boot", "/dev", "/proc", "/sys", "/root", "/home",
];

/// Lexically cleans `path`.
///
/// Removes `.` components and redundant separators and folds `name/..`
/// pairs. A `..` directly under the root is dropped; leading `..` of a
/// relative path are kept. The empty path cleans to `.`. No filesystem
/// access is performed.
///
/// # Examples
///
/// ```
/// use goinstall_core::security::clean_path;
/// use std::path::Path;
///
/// assert_eq!(clean_path(Path::new("/a/./b/../c//")), Path::new("/a/c"));
/// assert_eq!(clean_path(Path::new("/../etc")), Path::new("/etc"));
/// assert_eq!(clean_path(Path::new("../x/..")), Path::new(".."));
/// assert_eq!(clean_path(Path::new("")), Path::new("."));
/// ```
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// String-level prefix check: `path == root` or `path` starts with `root`
/// followed by a separator.
pub(crate) fn has_dir_prefix(path: &Path, root: &Path) -> bool {
    let path = path.as_os_str().as_encoded_bytes();
    let root = root.as_os_str().as_encoded_bytes();

    if path == root {
        return true;
    }
    let Some(rest) = path.strip_prefix(root) else {
        return false;
    };

    let is_sep = |byte: &u8| std::path::is_separator(char::from(*byte));
    root.last().is_some_and(is_sep) || rest.first().is_some_and(is_sep)
}

/// Dangling symlinks followed by [`resolve_existing_prefix`] before it
/// gives up.
const MAX_DANGLING_HOPS: usize = 40;

/// Resolves symlinks in the longest existing prefix of `path` and appends
/// the components that do not exist yet.
///
/// A dangling symlink in the prefix is followed to where it points, so a
/// later write through it is checked against its real destination.
///
/// # Errors
///
/// Fails if querying the filesystem fails for a reason other than
/// `NotFound`, or if too many dangling symlinks chain into each other.
pub fn resolve_existing_prefix<F: FileSystem + ?Sized>(path: &Path, fs: &F) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    // Names still to append, outermost first.
    let mut pending: Vec<OsString> = Vec::new();

    for _ in 0..=MAX_DANGLING_HOPS {
        let Some((existing, mut missing)) = split_existing(&current, fs)? else {
            return Ok(append_names(current, &pending));
        };
        missing.append(&mut pending);
        pending = missing;

        let err = match fs.eval_symlinks(&existing) {
            Ok(resolved) => return Ok(append_names(resolved, &pending)),
            Err(err) => err,
        };
        if err.kind() != io::ErrorKind::NotFound || !fs.lstat(&existing)?.is_symlink() {
            return Err(err);
        }

        let target = fs.read_link(&existing)?;
        let parent = match existing.parent() {
            Some(parent) => fs.eval_symlinks(parent)?,
            None => return Err(err),
        };
        current = clean_path(&parent.join(target));
    }

    Err(io::Error::other("too many levels of dangling symlinks"))
}

/// Splits `path` into its longest existing prefix and the missing names
/// below it, outermost first. `None` if no ancestor exists.
fn split_existing<F: FileSystem + ?Sized>(
    path: &Path,
    fs: &F,
) -> io::Result<Option<(PathBuf, Vec<OsString>)>> {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match fs.lstat(existing) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Ok(None),
                }
            }
            Err(e) => return Err(e),
        }
    }

    missing.reverse();
    Ok(Some((existing.to_path_buf(), missing)))
}

fn append_names(mut base: PathBuf, names: &[OsString]) -> PathBuf {
    for name in names {
        base.push(name);
    }
    base
}

fn is_absolute_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';

    name.starts_with('/') || name.starts_with('\\') || has_drive || Path::new(name).is_absolute()
}

/// Applies the four raw-string checks shared by entry names and link
/// targets.
fn check_raw(raw: &str) -> Result<(), SecurityError> {
    if is_absolute_name(raw) {
        return Err(SecurityError::new(raw, SecurityCheck::AbsolutePath));
    }
    if raw.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(SecurityError::new(raw, SecurityCheck::PathTraversal));
    }
    if raw.contains('\\') {
        return Err(SecurityError::new(raw, SecurityCheck::Backslash));
    }
    if raw.contains('\0') {
        return Err(SecurityError::new(raw, SecurityCheck::NullByte));
    }
    Ok(())
}

/// Validates a raw entry name from a tar header.
///
/// Rejects, in this order: absolute paths (including `\`-rooted and
/// drive-letter names), any `..` segment, backslashes, and NUL bytes.
///
/// # Examples
///
/// ```
/// use goinstall_core::error::SecurityCheck;
/// use goinstall_core::security::validate_header_name;
///
/// assert!(validate_header_name("go/bin/gofmt").is_ok());
///
/// let err = validate_header_name("/etc/passwd").unwrap_err();
/// assert_eq!(err.validation, SecurityCheck::AbsolutePath);
///
/// let err = validate_header_name("go/../../escape").unwrap_err();
/// assert_eq!(err.validation, SecurityCheck::PathTraversal);
/// ```
pub fn validate_header_name(name: &str) -> Result<(), SecurityError> {
    check_raw(name)
}

/// Rejects an entry whose name or link target was not valid UTF-8.
///
/// Decoding replaces invalid bytes with `U+FFFD`, so distinct byte names
/// would otherwise collapse onto the same path.
pub fn validate_encoding(entry: &ArchiveEntry) -> Result<(), SecurityError> {
    let raw = match entry.non_utf8 {
        None => return Ok(()),
        Some(HeaderField::Name) => &entry.name,
        Some(HeaderField::Linkname) => &entry.linkname,
    };
    Err(SecurityError::new(raw, SecurityCheck::InvalidEncoding))
}

/// Checks that `target` lies inside `dest_dir_clean`.
///
/// Two independent checks must both pass: a component-wise relative path
/// computation (the relative path must not be absolute or start with `..`)
/// and a string prefix match against `dest_dir_clean` plus a separator.
/// `target` is cleaned before either check.
///
/// # Examples
///
/// ```
/// use goinstall_core::security::validate_containment;
/// use std::path::Path;
///
/// let dest = Path::new("/opt/sdk");
/// assert!(validate_containment(Path::new("/opt/sdk/go/bin"), dest).is_ok());
/// assert!(validate_containment(Path::new("/opt/sdk"), dest).is_ok());
/// assert!(validate_containment(Path::new("/opt/sdk-evil/x"), dest).is_err());
/// assert!(validate_containment(Path::new("/opt/sdk/../etc"), dest).is_err());
/// ```
pub fn validate_containment(target: &Path, dest_dir_clean: &Path) -> Result<(), SecurityError> {
    let target = clean_path(target);

    let relative_ok = target
        .strip_prefix(dest_dir_clean)
        .is_ok_and(|rel| !rel.is_absolute() && !rel.starts_with(".."));
    let prefix_ok = has_dir_prefix(&target, dest_dir_clean);

    if relative_ok && prefix_ok {
        Ok(())
    } else {
        Err(SecurityError::new(target, SecurityCheck::PathContainment))
    }
}

/// Re-checks containment of `target` after resolving symlinks on disk.
///
/// A previous entry may have created a symlink that `target` passes
/// through. The longest existing prefix of `target` is resolved with
/// `eval_symlinks` and the result must still lie inside the destination.
/// Paths that do not exist yet are not an error.
pub fn resolve_and_validate_path<F: FileSystem + ?Sized>(
    target: &Path,
    dest: &DestDir,
    fs: &F,
) -> Result<(), SecurityError> {
    let resolved = resolve_existing_prefix(target, fs)
        .map_err(|e| SecurityError::with_cause(target, SecurityCheck::PathResolution, e))?;

    if dest.contains_resolved(&resolved) {
        Ok(())
    } else {
        Err(SecurityError::with_cause(
            target,
            SecurityCheck::PathResolution,
            SecurityCause::Escapes { resolved },
        ))
    }
}

fn check_sensitive(
    joined: &Path,
    dest: &DestDir,
    sensitive_dirs: &[PathBuf],
) -> Result<(), SecurityError> {
    let physical = joined
        .strip_prefix(dest.as_path())
        .map_or_else(|_| joined.to_path_buf(), |rel| dest.resolved().join(rel));

    for dir in sensitive_dirs {
        let dir = clean_path(dir);
        if dest.as_path().starts_with(&dir) {
            continue;
        }
        if joined.starts_with(&dir) || physical.starts_with(&dir) {
            return Err(SecurityError::new(joined, SecurityCheck::SensitivePath));
        }
    }
    Ok(())
}

/// Validates the target of a symlink or hardlink entry.
///
/// `base_dir` is the directory relative link targets are interpreted
/// against: the directory containing the link for symlinks, the
/// destination root for hardlinks. Steps, each short-circuiting:
///
/// 1. The raw checks of [`validate_header_name`] on `linkname`.
/// 2. Join `linkname` onto `base_dir` and clean the result.
/// 3. [`validate_containment`] of the joined path.
/// 4. Reject joined paths in a sensitive directory (see
///    [`DEFAULT_SENSITIVE_DIRS`]), both lexically and as seen through a
///    symlinked destination.
/// 5. Resolve every symlink already on disk along the link's path,
///    starting from the physical location of `base_dir`, and require the
///    final target to stay inside the destination. This closes the two-hop
///    escape where an earlier entry planted a symlink that this link is
///    routed through.
///
/// Returns the cleaned joined path on success.
pub fn validate_linkname<F: FileSystem + ?Sized>(
    linkname: &str,
    base_dir: &Path,
    dest: &DestDir,
    sensitive_dirs: &[PathBuf],
    fs: &F,
) -> Result<PathBuf, SecurityError> {
    check_raw(linkname)?;

    let joined = clean_path(&base_dir.join(linkname));
    validate_containment(&joined, dest.as_path())?;
    check_sensitive(&joined, dest, sensitive_dirs)?;

    let chain_error =
        |e: io::Error| SecurityError::with_cause(&joined, SecurityCheck::SymlinkChainValidation, e);

    let physical_base = resolve_existing_prefix(base_dir, fs).map_err(chain_error)?;
    let physical = clean_path(&physical_base.join(linkname));
    let resolved = resolve_existing_prefix(&physical, fs).map_err(chain_error)?;

    if !dest.contains_resolved(&resolved) {
        return Err(SecurityError::with_cause(
            &joined,
            SecurityCheck::SymlinkChainDestination,
            SecurityCause::Escapes { resolved },
        ));
    }

    Ok(joined)
}

/// Returns the default sensitive directory list as owned paths.
#[must_use]
pub fn default_sensitive_dirs() -> Vec<PathBuf> {
    DEFAULT_SENSITIVE_DIRS.iter().map(PathBuf::from).collect()
}
