//! Target architectures and the ABI → NDK architecture mapping.

use crate::error::ConfigError;
use serde::Serialize;
use std::str::FromStr;

/// ABIs packaged by default. Only 64-bit runtimes are shipped.
pub const DEFAULT_ABIS: &[&str] = &["arm64-v8a", "x86_64"];

/// Built-in ABI → NDK architecture names.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[("arm64-v8a", "aarch64"), ("x86_64", "x86_64")];

/// A packaging ABI paired with the architecture name used inside the NDK sysroot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Architecture {
    pub abi: String,
    pub ndk_arch: String,
}

impl Architecture {
    pub fn new(abi: impl Into<String>, ndk_arch: impl Into<String>) -> Self {
        Self {
            abi: abi.into(),
            ndk_arch: ndk_arch.into(),
        }
    }

    /// Sysroot library directory name, e.g. `aarch64-linux-android`.
    pub fn sysroot_triple(&self) -> String {
        format!("{}-linux-android", self.ndk_arch)
    }
}

/// `ABI=ARCH` override as given on the command line.
impl FromStr for Architecture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (abi, arch) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidMapping(s.to_string()))?;
        let (abi, arch) = (abi.trim(), arch.trim());
        if abi.is_empty() || arch.is_empty() {
            return Err(ConfigError::InvalidMapping(s.to_string()));
        }
        Ok(Architecture::new(abi, arch))
    }
}

/// Ordered mapping from ABI identifier to NDK architecture name.
///
/// Lookups are by exact ABI string. Later inserts replace earlier entries
/// for the same ABI but keep its original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchMap {
    entries: Vec<Architecture>,
}

impl Default for ArchMap {
    fn default() -> Self {
        let entries = DEFAULT_MAPPINGS
            .iter()
            .map(|(abi, arch)| Architecture::new(*abi, *arch))
            .collect();
        Self { entries }
    }
}

impl ArchMap {
    pub fn insert(&mut self, arch: Architecture) {
        match self.entries.iter_mut().find(|e| e.abi == arch.abi) {
            Some(existing) => existing.ndk_arch = arch.ndk_arch,
            None => self.entries.push(arch),
        }
    }

    /// Default mappings with `overrides` applied on top.
    pub fn with_overrides(overrides: impl IntoIterator<Item = Architecture>) -> Self {
        let mut map = Self::default();
        for arch in overrides {
            map.insert(arch);
        }
        map
    }

    pub fn resolve(&self, abi: &str) -> Option<&Architecture> {
        self.entries.iter().find(|e| e.abi == abi)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Architecture> {
        self.entries.iter()
    }
}

/// Normalizes a user-supplied ABI list: trims, drops duplicates, keeps order.
///
/// An empty list falls back to [`DEFAULT_ABIS`].
pub fn target_abis(requested: &[String]) -> Result<Vec<String>, ConfigError> {
    if requested.is_empty() {
        return Ok(DEFAULT_ABIS.iter().map(|s| s.to_string()).collect());
    }
    let mut abis: Vec<String> = Vec::with_capacity(requested.len());
    for raw in requested {
        let abi = raw.trim();
        if abi.is_empty() {
            return Err(ConfigError::EmptyAbi);
        }
        if !abis.iter().any(|a| a == abi) {
            abis.push(abi.to_string());
        }
    }
    Ok(abis)
}
