//! Entry names that try to leave the destination.

use std::fs;
use std::path::Path;

use goinstall_core::codec::GzipCodec;
use goinstall_core::error::Phase;
use goinstall_core::test_utils::RecordingFs;
use goinstall_core::test_utils::ScriptedCursor;
use goinstall_core::test_utils::TarTestBuilder;
use goinstall_core::types::ArchiveEntry;
use goinstall_core::Extractor;
use goinstall_core::ExtractorConfig;
use goinstall_core::NoopProgress;
use goinstall_core::SecurityCheck;
use tar::EntryType;

use crate::Sandbox;
use crate::assert_rejected;

fn raw_file(name: &[u8]) -> Vec<u8> {
    TarTestBuilder::new()
        .add_raw_entry(name, EntryType::Regular, b"", b"pwned")
        .build_gz()
}

#[test]
fn test_absolute_entry_name() {
    let sandbox = Sandbox::new();
    let name = sandbox.outside.join("pwned");

    let result = sandbox.extract(&raw_file(name.to_str().unwrap().as_bytes()));

    assert_rejected(result, SecurityCheck::AbsolutePath, Phase::ValidatingHeaderName);
    assert!(!name.exists());
    assert_eq!(Sandbox::count(&sandbox.dest), 0);
}

#[test]
fn test_leading_parent_dir() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_file(b"../outside/pwned"));

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ValidatingHeaderName);
    assert!(sandbox.outside_is_empty());
}

#[test]
fn test_nested_parent_dir() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_file(b"go/src/../../../outside/pwned"));

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ValidatingHeaderName);
    assert!(sandbox.outside_is_empty());
    assert!(!sandbox.dest.join("go").exists());
}

#[test]
fn test_parent_dir_that_stays_inside_is_still_rejected() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_file(b"go/bin/../VERSION"));

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ValidatingHeaderName);
}

#[test]
fn test_backslash_traversal() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_file(b"go\\..\\..\\outside\\pwned"));

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ValidatingHeaderName);
}

#[test]
fn test_backslash_separator() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_file(b"go\\bin\\go.exe"));

    assert_rejected(result, SecurityCheck::Backslash, Phase::ValidatingHeaderName);
    assert_eq!(Sandbox::count(&sandbox.dest), 0);
}

#[test]
fn test_drive_letter_name() {
    let sandbox = Sandbox::new();

    let result = sandbox.extract(&raw_file(b"C:/Windows/System32/evil.dll"));

    assert_rejected(result, SecurityCheck::AbsolutePath, Phase::ValidatingHeaderName);
}

#[test]
fn test_nul_byte_name() {
    // tar headers end names at the first NUL, so feed the entry directly.
    let sandbox = Sandbox::new();
    let extractor = Extractor::with_parts(ExtractorConfig::default(), RecordingFs::new(), GzipCodec);
    let mut cursor = ScriptedCursor::new()
        .entry_with_data(ArchiveEntry::file("go/bin/go\0.sh", 0o755, 2), b"ok");

    let result = extractor.extract_from_cursor(
        &mut cursor,
        Path::new("hostile.tar.gz"),
        &sandbox.dest,
        &mut NoopProgress,
    );

    assert_rejected(result, SecurityCheck::NullByte, Phase::ValidatingHeaderName);
    assert!(extractor.filesystem().mutations().is_empty());
}

#[test]
fn test_traversal_directory_entry() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_raw_entry(b"../outside/made/", EntryType::Directory, b"", b"")
        .build_gz();

    let result = sandbox.extract(&data);

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ValidatingHeaderName);
    assert!(sandbox.outside_is_empty());
}

#[test]
fn test_earlier_entries_remain_after_rejection() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_file("go/VERSION", b"go1.21.0", 0o644)
        .add_raw_entry(b"../outside/pwned", EntryType::Regular, b"", b"x")
        .add_file("go/never", b"never", 0o644)
        .build_gz();

    let result = sandbox.extract(&data);

    assert_rejected(result, SecurityCheck::PathTraversal, Phase::ValidatingHeaderName);
    assert_eq!(fs::read(sandbox.dest.join("go/VERSION")).unwrap(), b"go1.21.0");
    assert!(!sandbox.dest.join("go/never").exists());
    assert!(sandbox.outside_is_empty());
}

#[test]
fn test_dot_segments_are_accepted() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_raw_entry(b"./go/./VERSION", EntryType::Regular, b"", b"go1.21.0")
        .add_raw_entry(b"go/...", EntryType::Regular, b"", b"dots")
        .build_gz();

    let report = sandbox.extract(&data).expect("dot segments stay inside");

    assert_eq!(report.files_extracted, 2);
    assert_eq!(fs::read(sandbox.dest.join("go/VERSION")).unwrap(), b"go1.21.0");
    assert_eq!(fs::read(sandbox.dest.join("go/...")).unwrap(), b"dots");
}

#[test]
fn test_error_message_names_rule() {
    let sandbox = Sandbox::new();

    let err = sandbox.extract(&raw_file(b"../outside/pwned")).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("validating header name"), "{message}");
    assert!(message.contains("path traversal prevention"), "{message}");
}

#[test]
fn test_non_utf8_names_are_rejected_before_they_collide() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_raw_entry(b"go/\xff", EntryType::Regular, b"", b"A")
        .add_raw_entry(b"go/\xfe", EntryType::Regular, b"", b"B")
        .build_gz();

    let result = sandbox.extract(&data);

    assert_rejected(result, SecurityCheck::InvalidEncoding, Phase::ValidatingHeaderName);
    assert_eq!(Sandbox::count(&sandbox.dest), 0);
}

#[test]
fn test_non_utf8_link_target() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_file("go/VERSION", b"go1.21.0", 0o644)
        .add_raw_entry(b"go/latest", EntryType::Symlink, b"VERSION\xff", b"")
        .build_gz();

    let result = sandbox.extract(&data);

    assert_rejected(result, SecurityCheck::InvalidEncoding, Phase::ValidatingHeaderName);
    assert!(sandbox.dest.join("go/VERSION").is_file());
    assert!(fs::symlink_metadata(sandbox.dest.join("go/latest")).is_err());
}

#[test]
fn test_valid_replacement_character_is_accepted() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_file("go/\u{fffd}", b"literal", 0o644)
        .build_gz();

    let report = sandbox.extract(&data).expect("U+FFFD is valid UTF-8");

    assert_eq!(report.files_extracted, 1);
    assert_eq!(fs::read(sandbox.dest.join("go/\u{fffd}")).unwrap(), b"literal");
}
