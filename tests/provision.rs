//! End-to-end provisioning runs against fake NDK and project trees.

use std::fs;
use std::path::Path;

use stlstage::log::RecordingReporter;
use stlstage::provision::{AbiOutcome, ProvisionConfig, Provisioner};
use stlstage::verify::{self, StagedStatus};
use stlstage::{ArchMap, Architecture};
use tempfile::TempDir;

const ARTIFACT: &str = "libc++_shared.so";

/// Places a runtime library for `ndk_arch` under the default host tag.
fn install_runtime(ndk: &Path, ndk_arch: &str, contents: &[u8]) {
    let dir = ndk
        .join("toolchains/llvm/prebuilt/darwin-x86_64/sysroot/usr/lib")
        .join(format!("{ndk_arch}-linux-android"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(ARTIFACT), contents).unwrap();
}

fn config_for(ndk: &TempDir, project: &TempDir) -> ProvisionConfig {
    ProvisionConfig::new(ndk.path().to_string_lossy(), project.path())
}

fn run(config: &ProvisionConfig) -> (stlstage::ProvisionReport, RecordingReporter) {
    let mut reporter = RecordingReporter::default();
    let report = Provisioner::new(config, &mut reporter).run();
    (report, reporter)
}

#[test]
fn copies_runtime_for_every_abi_with_a_source() {
    let ndk = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    install_runtime(ndk.path(), "aarch64", b"arm64 runtime");
    install_runtime(ndk.path(), "x86_64", b"x86_64 runtime");
    let config = config_for(&ndk, &project);

    let (report, reporter) = run(&config);

    assert!(report.is_complete());
    assert_eq!(report.copied().count(), 2);
    assert!(reporter.warnings.is_empty());
    assert_eq!(reporter.notices.len(), 2);
    assert!(reporter.notices[0].contains("arm64-v8a"));

    for (abi, expected) in [
        ("arm64-v8a", &b"arm64 runtime"[..]),
        ("x86_64", &b"x86_64 runtime"[..]),
    ] {
        let staged = project.path().join("src/main/jniLibs").join(abi).join(ARTIFACT);
        assert_eq!(fs::read(&staged).unwrap(), expected, "{abi}");
    }
}

#[test]
fn partial_success_when_one_source_is_missing() {
    let ndk = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    install_runtime(ndk.path(), "aarch64", b"arm64 runtime");
    let config = config_for(&ndk, &project);

    let (report, reporter) = run(&config);

    let jni = project.path().join("src/main/jniLibs");
    assert_eq!(fs::read(jni.join("arm64-v8a").join(ARTIFACT)).unwrap(), b"arm64 runtime");
    assert!(!jni.join("x86_64").exists());

    assert_eq!(reporter.warnings.len(), 1);
    assert!(reporter.warnings[0].contains("x86_64-linux-android"));
    assert!(reporter.warnings[0].starts_with("Warning: libc++_shared.so not found at"));

    assert!(!report.is_complete());
    let skipped: Vec<_> = report.skipped().map(AbiOutcome::abi).collect();
    assert_eq!(skipped, ["x86_64"]);
    match &report.outcomes[1] {
        AbiOutcome::SkippedMissingSource { source, .. } => {
            assert_eq!(source, &config.source_path(&Architecture::new("x86_64", "x86_64")));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn empty_toolchain_root_writes_nothing() {
    let project = TempDir::new().unwrap();
    let config = ProvisionConfig::new("", project.path());

    let (report, reporter) = run(&config);

    assert!(report.is_disabled());
    assert!(reporter.warnings.is_empty());
    assert!(reporter.notices.is_empty());
    assert_eq!(fs::read_dir(project.path()).unwrap().count(), 0);
}

#[test]
fn second_run_overwrites_with_identical_content() {
    let ndk = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    install_runtime(ndk.path(), "aarch64", b"arm64 runtime");
    install_runtime(ndk.path(), "x86_64", b"x86_64 runtime");
    let config = config_for(&ndk, &project);

    let (first, _) = run(&config);
    let (second, reporter) = run(&config);

    assert_eq!(first, second);
    assert!(reporter.warnings.is_empty());
    assert!(verify::verify(&config).unwrap().is_consistent());
}

#[test]
fn stale_staged_copy_is_replaced() {
    let ndk = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    install_runtime(ndk.path(), "x86_64", b"new runtime");
    let mut config = config_for(&ndk, &project);
    config.abis = vec!["x86_64".into()];

    let staged = config.destination_path("x86_64");
    fs::create_dir_all(staged.parent().unwrap()).unwrap();
    fs::write(&staged, b"old runtime from a previous NDK").unwrap();
    assert_eq!(verify::verify(&config).unwrap().artifacts[0].status, StagedStatus::Stale);

    let (report, _) = run(&config);

    assert!(report.is_complete());
    assert_eq!(fs::read(&staged).unwrap(), b"new runtime");
    assert_eq!(verify::verify(&config).unwrap().artifacts[0].status, StagedStatus::Match);
}

#[test]
fn custom_mapping_and_host_tag() {
    let ndk = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let dir = ndk
        .path()
        .join("toolchains/llvm/prebuilt/linux-x86_64/sysroot/usr/lib/i686-linux-android");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(ARTIFACT), b"x86 runtime").unwrap();

    let mut config = config_for(&ndk, &project);
    config.host_tag = "linux-x86_64".into();
    config.abis = vec!["x86".into(), "riscv64".into()];
    config.arch_map = ArchMap::with_overrides([Architecture::new("x86", "i686")]);

    let (report, reporter) = run(&config);

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].is_copied());
    assert_eq!(
        report.outcomes[1],
        AbiOutcome::SkippedUnmapped { abi: "riscv64".into() }
    );
    assert!(reporter.warnings.is_empty());
    assert_eq!(
        fs::read(config.destination_path("x86")).unwrap(),
        b"x86 runtime"
    );
}

#[test]
fn report_serializes_with_status_tags() {
    let ndk = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    install_runtime(ndk.path(), "aarch64", b"abc");
    let config = config_for(&ndk, &project);

    let (report, _) = run(&config);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["disabled"], false);
    assert_eq!(json["outcomes"][0]["status"], "copied");
    assert_eq!(json["outcomes"][0]["bytes"], 3);
    assert_eq!(json["outcomes"][1]["status"], "skipped_missing_source");
}
