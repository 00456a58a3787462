//! Copies the NDK's shared C++ runtime into the project's `jniLibs` staging
//! area, one directory per ABI.
//!
//! The provisioner is best-effort: an ABI without an architecture mapping or
//! without a source artifact is skipped and recorded in the report, and the
//! caller decides whether that should fail the build. Filesystem errors on
//! one ABI are recorded as a failed outcome and the pass continues.

use crate::arch::{ArchMap, Architecture, DEFAULT_ABIS};
use crate::error::ProvisionError;
use crate::log::Reporter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Prebuilt toolchain variant read from when none is given.
///
/// NDK 27+ ships this layout even on Apple Silicon hosts. It is never derived
/// from the running host.
pub const DEFAULT_HOST_TAG: &str = "darwin-x86_64";

/// Runtime library needed by native code linked against `c++_shared`.
pub const DEFAULT_ARTIFACT: &str = "libc++_shared.so";

/// Everything a provisioning run needs, resolved up front by the caller.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// NDK root. Empty disables provisioning.
    pub toolchain_root: String,
    /// Target ABIs, processed in this order.
    pub abis: Vec<String>,
    pub arch_map: ArchMap,
    pub host_tag: String,
    pub artifact: String,
    /// Android module directory (the one containing `src/main`).
    pub project_dir: PathBuf,
}

impl ProvisionConfig {
    /// Config with the default ABIs, mapping, host tag and artifact.
    pub fn new(toolchain_root: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            toolchain_root: toolchain_root.into(),
            abis: DEFAULT_ABIS.iter().map(|s| s.to_string()).collect(),
            arch_map: ArchMap::default(),
            host_tag: DEFAULT_HOST_TAG.to_string(),
            artifact: DEFAULT_ARTIFACT.to_string(),
            project_dir: project_dir.into(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.toolchain_root.trim().is_empty()
    }

    /// `<root>/toolchains/llvm/prebuilt/<host>/sysroot/usr/lib/<arch>-linux-android/<artifact>`
    pub fn source_path(&self, arch: &Architecture) -> PathBuf {
        Path::new(&self.toolchain_root)
            .join("toolchains")
            .join("llvm")
            .join("prebuilt")
            .join(&self.host_tag)
            .join("sysroot")
            .join("usr")
            .join("lib")
            .join(arch.sysroot_triple())
            .join(&self.artifact)
    }

    pub fn destination_dir(&self, abi: &str) -> PathBuf {
        self.project_dir
            .join("src")
            .join("main")
            .join("jniLibs")
            .join(abi)
    }

    /// `<project>/src/main/jniLibs/<abi>/<artifact>`
    pub fn destination_path(&self, abi: &str) -> PathBuf {
        self.destination_dir(abi).join(&self.artifact)
    }
}

/// What happened to a single ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AbiOutcome {
    Copied {
        abi: String,
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },
    SkippedUnmapped {
        abi: String,
    },
    SkippedMissingSource {
        abi: String,
        source: PathBuf,
    },
    /// Creating the destination or copying failed.
    Failed {
        abi: String,
        error: String,
    },
}

impl AbiOutcome {
    pub fn abi(&self) -> &str {
        match self {
            AbiOutcome::Copied { abi, .. }
            | AbiOutcome::SkippedUnmapped { abi }
            | AbiOutcome::SkippedMissingSource { abi, .. }
            | AbiOutcome::Failed { abi, .. } => abi,
        }
    }

    pub fn is_copied(&self) -> bool {
        matches!(self, AbiOutcome::Copied { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// Set when the toolchain root was empty and nothing was attempted.
    pub disabled: bool,
    pub outcomes: Vec<AbiOutcome>,
}

impl ProvisionReport {
    fn disabled() -> Self {
        Self {
            disabled: true,
            outcomes: Vec::new(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn copied(&self) -> impl Iterator<Item = &AbiOutcome> {
        self.outcomes.iter().filter(|o| o.is_copied())
    }

    /// Every ABI that did not receive the artifact, failures included.
    pub fn skipped(&self) -> impl Iterator<Item = &AbiOutcome> {
        self.outcomes.iter().filter(|o| !o.is_copied())
    }

    pub fn failed(&self) -> impl Iterator<Item = &AbiOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AbiOutcome::Failed { .. }))
    }

    /// True when every target ABI received the artifact.
    ///
    /// A disabled run is not complete.
    pub fn is_complete(&self) -> bool {
        !self.disabled && self.skipped().next().is_none()
    }
}

pub struct Provisioner<'a, R: Reporter> {
    config: &'a ProvisionConfig,
    reporter: &'a mut R,
}

impl<'a, R: Reporter> Provisioner<'a, R> {
    pub fn new(config: &'a ProvisionConfig, reporter: &'a mut R) -> Self {
        Self { config, reporter }
    }

    /// Single linear pass over the target ABIs. Never aborts part way.
    pub fn run(&mut self) -> ProvisionReport {
        if self.config.is_disabled() {
            return ProvisionReport::disabled();
        }

        let mut report = ProvisionReport::default();
        for abi in &self.config.abis {
            let outcome = match self.provision_abi(abi) {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.reporter.warning(&format!("Warning: {err}"));
                    AbiOutcome::Failed {
                        abi: abi.clone(),
                        error: err.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }
        report
    }

    fn provision_abi(&mut self, abi: &str) -> Result<AbiOutcome, ProvisionError> {
        let Some(arch) = self.config.arch_map.resolve(abi) else {
            return Ok(AbiOutcome::SkippedUnmapped { abi: abi.to_string() });
        };

        let source = self.config.source_path(arch);
        if !source.is_file() {
            self.reporter.warning(&format!(
                "Warning: {} not found at {}",
                self.config.artifact,
                source.display()
            ));
            return Ok(AbiOutcome::SkippedMissingSource {
                abi: abi.to_string(),
                source,
            });
        }

        let dest_dir = self.config.destination_dir(abi);
        fs::create_dir_all(&dest_dir).map_err(|source| ProvisionError::CreateDir {
            path: dest_dir.clone(),
            source,
        })?;

        let destination = dest_dir.join(&self.config.artifact);
        let bytes = fs::copy(&source, &destination).map_err(|err| ProvisionError::Copy {
            from: source.clone(),
            to: destination.clone(),
            source: err,
        })?;

        self.reporter.notice(&format!(
            "✓ Copied {} for {} to {}",
            self.config.artifact,
            abi,
            destination.display()
        ));

        Ok(AbiOutcome::Copied {
            abi: abi.to_string(),
            source,
            destination,
            bytes,
        })
    }
}
