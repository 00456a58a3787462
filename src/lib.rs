//! Stages the NDK's shared C++ runtime (`libc++_shared.so`) into an Android
//! module's `src/main/jniLibs/<abi>/` directories so that bundled native
//! libraries linked against `c++_shared` can load on device.

pub mod arch;
pub mod error;
pub mod log;
pub mod ndk;
pub mod provision;
pub mod verify;

pub use arch::{ArchMap, Architecture};
pub use error::{ConfigError, ProvisionError};
pub use provision::{AbiOutcome, ProvisionConfig, ProvisionReport, Provisioner};
pub use verify::{StagedStatus, VerifyReport};
