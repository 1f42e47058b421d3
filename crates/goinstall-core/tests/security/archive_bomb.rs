//! Archives that try to exhaust disk space or inodes.

use goinstall_core::error::Phase;
use goinstall_core::error::QuotaExceeded;
use goinstall_core::test_utils::TarTestBuilder;
use goinstall_core::ExtractorConfig;
use goinstall_core::SecurityCheck;

use crate::Sandbox;
use crate::assert_rejected;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

#[test]
fn test_inode_exhaustion() {
    let sandbox = Sandbox::new();
    let mut builder = TarTestBuilder::new();
    for i in 0..101 {
        builder = builder.add_file(&format!("f{i:03}"), b"", 0o644);
    }
    let config = ExtractorConfig {
        max_files: 100,
        ..ExtractorConfig::default()
    };

    let result = sandbox.extract_with(config, &builder.build_gz());

    let err = assert_rejected(result, SecurityCheck::FileCountLimit, Phase::ValidatingFileCount);
    assert_eq!(
        err.security_error().unwrap().quota(),
        Some(&QuotaExceeded::FileCount {
            current: 101,
            max: 100
        })
    );
    assert_eq!(Sandbox::count(&sandbox.dest), 100);
    assert!(!sandbox.dest.join("f100").exists());
}

#[test]
fn test_directories_count_toward_file_limit() {
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_directory("go/", 0o755)
        .add_directory("go/bin/", 0o755)
        .add_directory("go/src/", 0o755)
        .build_gz();
    let config = ExtractorConfig {
        max_files: 2,
        ..ExtractorConfig::default()
    };

    let result = sandbox.extract_with(config, &data);

    assert_rejected(result, SecurityCheck::FileCountLimit, Phase::ValidatingFileCount);
    assert!(!sandbox.dest.join("go/src").exists());
}

#[test]
fn test_declared_size_rejected_before_any_write() {
    // The header claims 3 GiB; the body is never read.
    let sandbox = Sandbox::new();
    let data = TarTestBuilder::new()
        .add_file_declaring("go/huge", 3 * 1024 * MIB, b"tiny")
        .build_gz();

    let result = sandbox.extract(&data);

    let err = assert_rejected(result, SecurityCheck::FileSizeLimit, Phase::ValidatingFileSize);
    assert!(matches!(
        err.security_error().unwrap().quota(),
        Some(QuotaExceeded::FileSize { .. })
    ));
    assert!(!sandbox.dest.join("go").exists());
}

#[test]
fn test_high_ratio_gzip_payload() {
    let sandbox = Sandbox::new();
    let zeros = vec![0u8; usize::try_from(4 * MIB).unwrap()];
    let data = TarTestBuilder::new()
        .add_file("go/zeros", &zeros, 0o644)
        .build_gz();
    assert!(data.len() < 64 * 1024, "payload should compress well");
    let config = ExtractorConfig {
        max_file_size: MIB,
        ..ExtractorConfig::default()
    };

    let result = sandbox.extract_with(config, &data);

    assert_rejected(result, SecurityCheck::FileSizeLimit, Phase::ValidatingFileSize);
    assert!(!sandbox.dest.join("go/zeros").exists());
}

#[test]
fn test_total_size_spread_over_many_files() {
    let sandbox = Sandbox::new();
    let chunk = vec![b'x'; usize::try_from(KIB).unwrap()];
    let mut builder = TarTestBuilder::new();
    for i in 0..10 {
        builder = builder.add_file(&format!("part{i}"), &chunk, 0o644);
    }
    let config = ExtractorConfig {
        max_total_size: 4 * KIB,
        ..ExtractorConfig::default()
    };

    let result = sandbox.extract_with(config, &builder.build_gz());

    let err = assert_rejected(result, SecurityCheck::TotalSizeLimit, Phase::ValidatingTotalSize);
    assert_eq!(
        err.security_error().unwrap().quota(),
        Some(&QuotaExceeded::TotalSize {
            current: 5 * KIB,
            max: 4 * KIB
        })
    );
    assert_eq!(Sandbox::count(&sandbox.dest), 4);
}
