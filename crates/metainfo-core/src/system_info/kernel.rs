use nix::sys::utsname::uname;
use tracing::debug;

use crate::error::{SystemInfoError, SystemInfoResult};

/// Kernel name and release of the running system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelInfo {
    pub name: String,
    pub version: String,
}

impl KernelInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn from_uname() -> SystemInfoResult<Self> {
        let uts = uname().map_err(SystemInfoError::Uname)?;
        let name = uts.sysname().to_string_lossy().into_owned();
        let release = uts.release().to_string_lossy();
        let kernel = Self::new(name, strip_build_suffix(&release));
        debug!(name = %kernel.name, version = %kernel.version, "read kernel details");
        Ok(kernel)
    }
}

/// Drops the distribution build suffix: `6.1.0-13-amd64` becomes `6.1.0-13`.
fn strip_build_suffix(release: &str) -> &str {
    match release.rfind('-') {
        Some(idx) => &release[..idx],
        None => release,
    }
}
