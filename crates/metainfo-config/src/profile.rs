use std::{collections::BTreeMap, path::PathBuf};

use documented::{Documented, DocumentedFields};
use metainfo_utils::path::expand_path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Connectivity a profile claims to have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InternetMode {
    Offline,
    Online,
}

/// A device profile describes a target machine without probing it.
///
/// Every field is optional. When `chassis` is set, its template is applied
/// first and the remaining fields override it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct DeviceProfile {
    /// Chassis template: desktop, laptop, server, tablet or handset.
    pub chassis: Option<String>,

    /// Total physical memory in MiB.
    pub memory_mib: Option<u64>,

    /// Kernel name as reported by uname, e.g. "Linux".
    pub kernel_name: Option<String>,

    /// Kernel release without the build suffix, e.g. "6.6.8".
    pub kernel_version: Option<String>,

    /// Shortest display side in logical pixels.
    pub display_shortest: Option<u32>,

    /// Longest display side in logical pixels.
    pub display_longest: Option<u32>,

    /// Whether a graphical session is available.
    pub gui: Option<bool>,

    /// Input controls known to be present (true) or absent (false).
    /// Keys: console, keyboard, pointing, gamepad, tablet, touch, voice, vision, tv-remote.
    pub controls: Option<BTreeMap<String, bool>>,

    /// Network connectivity: "offline" or "online".
    pub internet: Option<InternetMode>,

    /// Available bandwidth in Mbit/s when online.
    pub bandwidth_mbitps: Option<u32>,

    /// Path to an os-release file describing the operating system.
    pub os_release: Option<String>,
}

impl DeviceProfile {
    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        if let (Some(shortest), Some(longest)) = (self.display_shortest, self.display_longest) {
            if shortest > longest {
                return Err(ConfigError::InvalidDisplay {
                    profile: name.to_string(),
                    shortest,
                    longest,
                });
            }
        }
        Ok(())
    }

    pub fn os_release_path(&self) -> Result<Option<PathBuf>> {
        self.os_release
            .as_deref()
            .map(expand_path)
            .transpose()
            .map_err(Into::into)
    }
}
