//! Error types for stlstage.
//!
//! Skipped ABIs are not errors; they are reported as outcomes. Only real
//! filesystem failures and malformed user input end up here.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a provisioning or verification run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Invalid configuration supplied on the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid architecture mapping '{0}': expected ABI=ARCH")]
    InvalidMapping(String),
    #[error("empty ABI identifier")]
    EmptyAbi,
}
