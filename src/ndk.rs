//! Locating the NDK and inspecting what it ships.
//!
//! Environment and property lookups live here so the provisioner itself never
//! touches process state. The CLI resolves the toolchain root once and hands
//! the result over.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Environment variable consulted for the toolchain root.
pub const NDK_HOME_VAR: &str = "ANDROID_NDK_HOME";

/// Build property consulted when the environment variable is unset.
pub const NDK_PATH_PROPERTY: &str = "android.ndk.path";

/// How Gradle exposes [`NDK_PATH_PROPERTY`] as a JVM system property.
pub const NDK_PATH_SYSTEM_PROPERTY: &str = "systemProp.android.ndk.path";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("valid version regex"));

/// Where the toolchain root came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootOrigin {
    Flag,
    Environment,
    GradleProperties,
    LocalProperties,
    Unset,
}

impl fmt::Display for RootOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RootOrigin::Flag => "--ndk",
            RootOrigin::Environment => NDK_HOME_VAR,
            RootOrigin::GradleProperties => "gradle.properties",
            RootOrigin::LocalProperties => "local.properties",
            RootOrigin::Unset => "unset",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainRoot {
    pub path: String,
    pub origin: RootOrigin,
}

/// Resolves the toolchain root: `--ndk`, then `ANDROID_NDK_HOME`, then the
/// `android.ndk.path` property, then empty.
///
/// A set environment variable wins even when it is empty, which disables
/// provisioning. Property files are read from `project_dir` and its parent,
/// so `project_dir` should be absolute. In `gradle.properties` the
/// `systemProp.` form is preferred over the bare key; `local.properties` may
/// also name the NDK as `ndk.dir`.
pub fn resolve_toolchain_root(
    flag: Option<&str>,
    env_value: Option<String>,
    project_dir: &Path,
) -> ToolchainRoot {
    if let Some(path) = flag.filter(|p| !p.is_empty()) {
        return ToolchainRoot {
            path: path.to_string(),
            origin: RootOrigin::Flag,
        };
    }
    if let Some(path) = env_value {
        return ToolchainRoot {
            path,
            origin: RootOrigin::Environment,
        };
    }

    // Module directory first, then the enclosing Gradle root project.
    let search: Vec<&Path> = std::iter::once(project_dir)
        .chain(project_dir.parent())
        .collect();

    for dir in &search {
        if let Ok(props) = read_properties(&dir.join("gradle.properties")) {
            let value = props
                .get(NDK_PATH_SYSTEM_PROPERTY)
                .or_else(|| props.get(NDK_PATH_PROPERTY));
            if let Some(path) = value {
                return ToolchainRoot {
                    path: path.clone(),
                    origin: RootOrigin::GradleProperties,
                };
            }
        }
    }
    for dir in &search {
        if let Ok(props) = read_properties(&dir.join("local.properties")) {
            if let Some(path) = props.get(NDK_PATH_PROPERTY).or_else(|| props.get("ndk.dir")) {
                return ToolchainRoot {
                    path: path.clone(),
                    origin: RootOrigin::LocalProperties,
                };
            }
        }
    }

    ToolchainRoot {
        path: String::new(),
        origin: RootOrigin::Unset,
    }
}

/// Makes `dir` absolute so that its parent is the real enclosing directory.
///
/// Symlinks are resolved when `dir` exists.
pub fn absolute_dir(dir: &Path) -> io::Result<PathBuf> {
    dir.canonicalize().or_else(|_| std::path::absolute(dir))
}

pub fn read_properties(path: &Path) -> io::Result<HashMap<String, String>> {
    Ok(parse_properties(&fs::read_to_string(path)?))
}

/// Parses Java-style `.properties` content.
///
/// Handles `=` and `:` separators, `#`/`!` comments and backslash escapes.
/// Line continuations are not supported.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for line in content.lines() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut key = String::new();
        let mut chars = line.chars();
        let mut escaped = false;
        let mut found_separator = false;
        for c in chars.by_ref() {
            if escaped {
                key.push(unescape(c));
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '=' || c == ':' {
                found_separator = true;
                break;
            } else {
                key.push(c);
            }
        }
        if !found_separator {
            continue;
        }

        let mut value = String::new();
        let mut escaped = false;
        for c in chars {
            if escaped {
                value.push(unescape(c));
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else {
                value.push(c);
            }
        }
        props.insert(key.trim().to_string(), value.trim().to_string());
    }
    props
}

fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        other => other,
    }
}

/// Detects Android SDK location from environment variables or common paths.
pub fn detect_android_sdk() -> Option<PathBuf> {
    let mut sdk_paths: Vec<PathBuf> = ["ANDROID_SDK_ROOT", "ANDROID_HOME"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();

    if let Some(home) = dirs::home_dir() {
        let default = match env::consts::OS {
            "windows" => home.join("AppData").join("Local").join("Android").join("Sdk"),
            "macos" => home.join("Library").join("Android").join("sdk"),
            _ => home.join("Android").join("Sdk"),
        };
        sdk_paths.push(default);
    }

    sdk_paths.into_iter().find(|p| p.exists())
}

/// Best-effort NDK discovery for diagnostics.
pub fn detect_android_ndk() -> Option<PathBuf> {
    if let Ok(ndk_home) = env::var(NDK_HOME_VAR) {
        let path = PathBuf::from(ndk_home);
        if path.exists() {
            return Some(path);
        }
    }

    let sdk = detect_android_sdk()?;
    let ndk_bundle = sdk.join("ndk-bundle");
    if ndk_bundle.exists() {
        return Some(ndk_bundle);
    }
    newest_ndk_in(&sdk.join("ndk"))
}

/// Picks the highest-versioned `<dir>/<major.minor.build>` NDK install.
pub fn newest_ndk_in(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let version = path.file_name()?.to_str().and_then(parse_version)?;
            Some((version, path))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path)
}

/// Parses `27.0.12077973` (optionally followed by a suffix such as `-beta1`).
pub fn parse_version(s: &str) -> Option<(u32, u32, u32)> {
    let caps = VERSION_RE.captures(s.trim())?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

/// `Pkg.Revision` from the NDK's `source.properties`.
pub fn ndk_revision(root: &Path) -> Option<String> {
    let props = read_properties(&root.join("source.properties")).ok()?;
    props.get("Pkg.Revision").cloned()
}

fn prebuilt_dir(root: &Path) -> PathBuf {
    root.join("toolchains").join("llvm").join("prebuilt")
}

/// Host tags with a prebuilt toolchain, sorted.
pub fn host_tags(root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(prebuilt_dir(root)) else {
        return Vec::new();
    };
    let mut tags: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    tags.sort();
    tags
}

/// A runtime artifact present in the NDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundArtifact {
    pub host_tag: String,
    /// Sysroot triple, e.g. `aarch64-linux-android`.
    pub triple: String,
    pub path: PathBuf,
}

/// Every `prebuilt/<host>/sysroot/usr/lib/<triple>/<artifact>` under `root`.
///
/// API-level subdirectories (`<triple>/<api>/`) are not included.
pub fn find_artifacts(root: &Path, artifact: &str) -> Vec<FoundArtifact> {
    let prebuilt = prebuilt_dir(root);
    WalkDir::new(&prebuilt)
        .min_depth(6)
        .max_depth(6)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == artifact)
        .filter_map(|e| {
            let rel = e.path().strip_prefix(&prebuilt).ok()?;
            let parts: Vec<&str> = rel.iter().filter_map(|c| c.to_str()).collect();
            match parts.as_slice() {
                [host, "sysroot", "usr", "lib", triple, _] => Some(FoundArtifact {
                    host_tag: host.to_string(),
                    triple: triple.to_string(),
                    path: e.path().to_path_buf(),
                }),
                _ => None,
            }
        })
        .collect()
}
