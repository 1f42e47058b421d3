//! Hardlink entries that try to alias files outside the destination.

use std::fs;

use goinstall_core::error::Phase;
use goinstall_core::test_utils::TarTestBuilder;
use goinstall_core::SecurityCheck;
use tar::EntryType;

use crate::Sandbox;
use crate::assert_rejected;

fn raw_hardlink(name: &[u8], target: &[u8]) -> Vec<u8> {
    TarTestBuilder::new()
        .add_raw_entry(name, EntryType::Link, target, b"")
        .build_gz()
}

#[test]
fn test_absolute_hardlink_target() {
    let sandbox = Sandbox::new();
    let secret = sandbox.outside.join("secret");
    fs::write(&secret, b"secret").unwrap();

    let result = sandbox.extract(&raw_hardlink(b"go/secret", secret.to_str().unwrap().as_bytes()));

    assert_rejected(result, SecurityCheck::AbsolutePath, Phase::ExtractingHardlink);
    assert!(!sandbox.dest.join("go/secret").exists());
}

#[test]
fn test_parent_traversal_hardlink_target() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.outside.join("secret"), b"secret").unwrap();

    let result = sandbox.extract(&raw_hardlink(b"go/secret", b"../outside/secret"));

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ExtractingHardlink);
    assert!(!sandbox.dest.join("go/secret").exists());
}

#[test]
fn test_hardlink_target_is_relative_to_destination_root() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_file("go/bin/go", b"go binary", 0o755)
        .add_hardlink("go/pkg/tool/go", "go/bin/go")
        .build_gz();

    let report = sandbox.extract(&data).expect("contained hardlink is allowed");

    assert_eq!(report.hardlinks_created, 1);
    assert_eq!(fs::read(sandbox.dest.join("go/pkg/tool/go")).unwrap(), b"go binary");
}

#[test]
fn test_hardlink_to_missing_target() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_hardlink(b"go/link", b"go/absent"));

    let err = result.expect_err("linking to nothing must fail");
    assert_eq!(err.phase(), Phase::ExtractingHardlink);
    assert!(err.io_error().is_some());
}

#[test]
#[cfg(unix)]
fn test_hardlink_through_planted_symlink() {
    use std::os::unix::fs::MetadataExt;
    use std::os::unix::fs::symlink;

    let sandbox = Sandbox::new();
    let secret = sandbox.outside.join("secret");
    fs::write(&secret, b"secret").unwrap();
    symlink(&sandbox.outside, sandbox.dest.join("planted")).unwrap();

    let result = sandbox.extract(&raw_hardlink(b"go/secret", b"planted/secret"));

    assert_rejected(
        result,
        SecurityCheck::SymlinkChainDestination,
        Phase::ExtractingHardlink,
    );
    assert!(!sandbox.dest.join("go/secret").exists());
    assert_eq!(fs::metadata(&secret).unwrap().nlink(), 1);
}

#[test]
#[cfg(unix)]
fn test_hardlink_to_symlink_pointing_outside() {
    use std::os::unix::fs::MetadataExt;
    use std::os::unix::fs::symlink;

    let sandbox = Sandbox::new();
    let secret = sandbox.outside.join("secret");
    fs::write(&secret, b"secret").unwrap();
    symlink(&secret, sandbox.dest.join("shortcut")).unwrap();

    let result = sandbox.extract(&raw_hardlink(b"stolen", b"shortcut"));

    assert_rejected(
        result,
        SecurityCheck::SymlinkChainDestination,
        Phase::ExtractingHardlink,
    );
    assert_eq!(fs::metadata(&secret).unwrap().nlink(), 1);
}
