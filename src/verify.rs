//! Checks that staged runtime artifacts match their NDK sources.

use crate::error::ProvisionError;
use crate::provision::ProvisionConfig;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagedStatus {
    /// Staged file is byte-identical to the source.
    Match,
    /// Staged file differs from the source.
    Stale,
    /// Source exists but nothing is staged.
    Missing,
    /// No source artifact in the toolchain.
    NoSource,
    /// ABI has no architecture mapping.
    Unmapped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedArtifact {
    pub abi: String,
    pub status: StagedStatus,
    pub destination: PathBuf,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub disabled: bool,
    pub artifacts: Vec<StagedArtifact>,
}

impl VerifyReport {
    /// No staged artifact is stale or missing.
    pub fn is_consistent(&self) -> bool {
        self.artifacts
            .iter()
            .all(|a| !matches!(a.status, StagedStatus::Stale | StagedStatus::Missing))
    }
}

pub fn verify(config: &ProvisionConfig) -> Result<VerifyReport, ProvisionError> {
    if config.is_disabled() {
        return Ok(VerifyReport {
            disabled: true,
            artifacts: Vec::new(),
        });
    }

    let mut report = VerifyReport::default();
    for abi in &config.abis {
        let destination = config.destination_path(abi);
        let Some(arch) = config.arch_map.resolve(abi) else {
            report.artifacts.push(StagedArtifact {
                abi: abi.clone(),
                status: StagedStatus::Unmapped,
                destination,
                source: None,
            });
            continue;
        };

        let source = config.source_path(arch);
        let status = if !source.is_file() {
            StagedStatus::NoSource
        } else if !destination.is_file() {
            StagedStatus::Missing
        } else if read(&source)? == read(&destination)? {
            StagedStatus::Match
        } else {
            StagedStatus::Stale
        };

        report.artifacts.push(StagedArtifact {
            abi: abi.clone(),
            status,
            destination,
            source: Some(source),
        });
    }
    Ok(report)
}

fn read(path: &Path) -> Result<Vec<u8>, ProvisionError> {
    fs::read(path).map_err(|source| ProvisionError::Read {
        path: path.to_path_buf(),
        source,
    })
}
