//! Symlink entries and symlinks already on disk that try to redirect
//! writes outside the destination.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;
use std::path::PathBuf;

use goinstall_core::error::Phase;
use goinstall_core::error::SecurityCause;
use goinstall_core::test_utils::TarTestBuilder;
use goinstall_core::test_utils::write_archive;
use goinstall_core::Extractor;
use goinstall_core::ExtractorConfig;
use goinstall_core::SecurityCheck;
use tar::EntryType;

use crate::Sandbox;
use crate::assert_rejected;

fn raw_symlink(name: &[u8], target: &[u8]) -> Vec<u8> {
    TarTestBuilder::new()
        .add_raw_entry(name, EntryType::Symlink, target, b"")
        .build_gz()
}

#[test]
fn test_absolute_symlink_target() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_symlink(b"go/passwd", b"/etc/passwd"));

    assert_rejected(result, SecurityCheck::AbsolutePath, Phase::ExtractingSymlink);
    assert!(fs::symlink_metadata(sandbox.dest.join("go/passwd")).is_err());
}

#[test]
fn test_parent_traversal_target() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_symlink(b"go/escape", b"../../outside"));

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ExtractingSymlink);
    assert!(fs::symlink_metadata(sandbox.dest.join("go/escape")).is_err());
}

#[test]
fn test_backslash_target() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_symlink(b"go/win", b"bin\\go.exe"));

    assert_rejected(result, SecurityCheck::Backslash, Phase::ExtractingSymlink);
}

#[test]
fn test_relative_targets_inside_are_created() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_file("go/bin/go", b"go", 0o755)
        .add_symlink("go/current", "bin")
        .add_symlink("go/tool", "current/go")
        .add_symlink("go/dangling", "not-yet-there")
        .build_gz();

    let report = sandbox.extract(&data).expect("contained links are allowed");

    assert_eq!(report.symlinks_created, 3);
    assert_eq!(fs::read_link(sandbox.dest.join("go/tool")).unwrap(), PathBuf::from("current/go"));
    assert_eq!(fs::read(sandbox.dest.join("go/tool")).unwrap(), b"go");
}

#[test]
fn test_two_hop_through_planted_symlink() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.outside.join("secret"), b"secret").unwrap();
    fs::create_dir_all(sandbox.dest.join("go")).unwrap();
    symlink(&sandbox.outside, sandbox.dest.join("go/planted")).unwrap();

    let result = sandbox.extract(&raw_symlink(b"go/link", b"planted/secret"));

    let err = assert_rejected(
        result,
        SecurityCheck::SymlinkChainDestination,
        Phase::ExtractingSymlink,
    );
    let security = err.security_error().unwrap();
    assert!(matches!(security.cause, Some(SecurityCause::Escapes { .. })));
    assert!(fs::symlink_metadata(sandbox.dest.join("go/link")).is_err());
}

#[test]
fn test_link_in_directory_reached_through_symlink() {
    // `go/alias` points outside; a link placed under it would be created
    // outside the destination.
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.dest.join("go")).unwrap();
    symlink(&sandbox.outside, sandbox.dest.join("go/alias")).unwrap();

    let result = sandbox.extract(&raw_symlink(b"go/alias/link", b"target"));

    assert_rejected(result, SecurityCheck::PathResolution, Phase::ValidatingHeaderName);
    assert!(sandbox.outside_is_empty());
}

#[test]
fn test_file_written_through_planted_symlink() {
    let sandbox = Sandbox::new();
    symlink(&sandbox.outside, sandbox.dest.join("go")).unwrap();
    let data = TarTestBuilder::new()
        .add_file("go/bin/go", b"payload", 0o755)
        .build_gz();

    let result = sandbox.extract(&data);

    let err = assert_rejected(result, SecurityCheck::PathResolution, Phase::ValidatingHeaderName);
    let security = err.security_error().unwrap();
    assert!(matches!(security.cause, Some(SecurityCause::Escapes { .. })));
    assert!(sandbox.outside_is_empty());
}

#[test]
fn test_file_written_through_dangling_symlink_inside() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_symlink("go/a", "b")
        .add_file("go/a", b"through", 0o644)
        .build_gz();

    let report = sandbox.extract(&data).expect("link target stays inside");

    assert_eq!(report.files_extracted, 1);
    assert_eq!(fs::read(sandbox.dest.join("go/b")).unwrap(), b"through");
    assert!(fs::symlink_metadata(sandbox.dest.join("go/a")).unwrap().is_symlink());
}

#[test]
fn test_file_written_through_dangling_symlink_outside() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.dest.join("go")).unwrap();
    symlink(sandbox.outside.join("planted"), sandbox.dest.join("go/a")).unwrap();
    let data = TarTestBuilder::new()
        .add_file("go/a", b"payload", 0o644)
        .build_gz();

    let result = sandbox.extract(&data);

    let err = assert_rejected(result, SecurityCheck::PathResolution, Phase::ValidatingHeaderName);
    let security = err.security_error().unwrap();
    assert!(matches!(security.cause, Some(SecurityCause::Escapes { .. })));
    assert!(sandbox.outside_is_empty());
}

#[test]
fn test_symlink_loop_on_target_path() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.dest.join("go")).unwrap();
    symlink("loop", sandbox.dest.join("go/loop")).unwrap();

    let result = sandbox.extract(&raw_symlink(b"go/link", b"loop/x"));

    assert_rejected(
        result,
        SecurityCheck::SymlinkChainValidation,
        Phase::ExtractingSymlink,
    );
}

#[test]
fn test_symlink_into_protected_dir_through_symlinked_destination() {
    // The destination path looks harmless but physically lives inside a
    // protected directory; links landing there are refused.
    let sandbox = Sandbox::new();
    let protected = sandbox.temp.path().join("protected");
    fs::create_dir_all(protected.join("stage")).unwrap();
    let staged = sandbox.temp.path().join("staged");
    symlink(protected.join("stage"), &staged).unwrap();

    let config = ExtractorConfig {
        sensitive_dirs: vec![fs::canonicalize(&protected).unwrap()],
        ..ExtractorConfig::default()
    };
    let archive = write_archive(
        sandbox.temp.path(),
        "hostile.tar.gz",
        &raw_symlink(b"go/link", b"VERSION"),
    );

    let result = Extractor::new(config).extract(&archive, &staged);

    assert_rejected(result, SecurityCheck::SensitivePath, Phase::ExtractingSymlink);
}

#[test]
fn test_protected_dir_exempt_when_destination_inside() {
    let sandbox = Sandbox::new();
    let config = ExtractorConfig {
        sensitive_dirs: vec![sandbox.temp.path().to_path_buf()],
        ..ExtractorConfig::default()
    };
    let data = TarTestBuilder::new()
        .add_file("go/VERSION", b"go1.21.0", 0o644)
        .add_symlink("go/latest", "VERSION")
        .build_gz();

    let report = sandbox.extract_with(config, &data).expect("destination chose the protected dir");

    assert_eq!(report.symlinks_created, 1);
}
