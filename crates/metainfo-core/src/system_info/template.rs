use std::{collections::BTreeMap, fmt, str::FromStr};

use metainfo_config::{
    config::ProbePaths,
    profile::{DeviceProfile, InternetMode},
};
use metainfo_utils::error::{ParseError, ParseResult};
use tracing::debug;

use super::{InternetConnectivity, SystemInfo};
use crate::{
    error::{SystemInfoError, SystemInfoResult},
    relation::{ControlKind, DisplaySide},
    MetainfoResult,
};

/// Device classes with a predefined system description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChassisKind {
    Unknown,
    Desktop,
    Laptop,
    Server,
    Tablet,
    Handset,
}

impl ChassisKind {
    /// Chassis kinds that have a template.
    pub const TEMPLATES: &'static [ChassisKind] = &[
        ChassisKind::Desktop,
        ChassisKind::Laptop,
        ChassisKind::Server,
        ChassisKind::Tablet,
        ChassisKind::Handset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChassisKind::Unknown => "unknown",
            ChassisKind::Desktop => "desktop",
            ChassisKind::Laptop => "laptop",
            ChassisKind::Server => "server",
            ChassisKind::Tablet => "tablet",
            ChassisKind::Handset => "handset",
        }
    }
}

impl fmt::Display for ChassisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChassisKind {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty { kind: "chassis" }),
            "unknown" => Ok(ChassisKind::Unknown),
            "desktop" => Ok(ChassisKind::Desktop),
            "laptop" => Ok(ChassisKind::Laptop),
            "server" => Ok(ChassisKind::Server),
            "tablet" => Ok(ChassisKind::Tablet),
            "handset" | "phone" => Ok(ChassisKind::Handset),
            other => Err(ParseError::UnknownValue {
                kind: "chassis",
                value: other.to_string(),
            }),
        }
    }
}

struct Template {
    memory_mib: u64,
    shortest: u32,
    longest: u32,
    gui: bool,
    controls: &'static [ControlKind],
}

fn template_for(chassis: ChassisKind) -> SystemInfoResult<Template> {
    const POINTER_DESKTOP: &[ControlKind] =
        &[ControlKind::Pointing, ControlKind::Keyboard, ControlKind::Console];

    let template = match chassis {
        ChassisKind::Desktop | ChassisKind::Laptop => Template {
            memory_mib: 8192,
            shortest: 800,
            longest: 1280,
            gui: true,
            controls: POINTER_DESKTOP,
        },
        ChassisKind::Server => Template {
            memory_mib: 8192,
            shortest: 0,
            longest: 0,
            gui: false,
            controls: &[ControlKind::Keyboard, ControlKind::Console],
        },
        ChassisKind::Tablet => Template {
            memory_mib: 4096,
            shortest: 600,
            longest: 1024,
            gui: true,
            controls: &[ControlKind::Touch],
        },
        ChassisKind::Handset => Template {
            memory_mib: 4096,
            shortest: 320,
            longest: 480,
            gui: true,
            controls: &[ControlKind::Touch],
        },
        ChassisKind::Unknown => {
            return Err(SystemInfoError::UnsupportedChassis(chassis.to_string()));
        }
    };
    Ok(template)
}

impl SystemInfo {
    /// A mock system for a typical device of the given chassis.
    ///
    /// Nothing about input or devices is probed: every control is either
    /// present per the template or absent, and the modalias inventory is
    /// empty.
    pub fn for_chassis(chassis: ChassisKind) -> SystemInfoResult<Self> {
        let mut sysinfo = Self::new();
        sysinfo.apply_chassis(chassis)?;
        Ok(sysinfo)
    }

    fn apply_chassis(&mut self, chassis: ChassisKind) -> SystemInfoResult<()> {
        let template = template_for(chassis)?;
        debug!("applying {chassis} template");

        self.set_memory_total(template.memory_mib);
        self.set_display_length(DisplaySide::Shortest, template.shortest);
        self.set_display_length(DisplaySide::Longest, template.longest);
        self.set_gui_available(template.gui);

        self.controls.clear();
        for kind in template.controls {
            self.set_input_control(*kind, true);
        }
        self.mark_controls_tested();
        self.modaliases = Some(BTreeMap::new());
        Ok(())
    }

    /// Builds a system description from a configured device profile.
    pub fn from_profile(profile: &DeviceProfile, paths: ProbePaths) -> MetainfoResult<Self> {
        let mut sysinfo = Self::with_paths(paths);
        sysinfo.apply_profile(profile)?;
        Ok(sysinfo)
    }

    /// Applies the profile's chassis template, then its explicit fields.
    /// Facts the profile leaves out keep their current value or are probed.
    pub fn apply_profile(&mut self, profile: &DeviceProfile) -> MetainfoResult<()> {
        if let Some(chassis) = &profile.chassis {
            let chassis: ChassisKind = chassis.parse().map_err(SystemInfoError::from)?;
            self.apply_chassis(chassis)?;
        }

        if let Some(mib) = profile.memory_mib {
            self.set_memory_total(mib);
        }
        if let Some(name) = &profile.kernel_name {
            let version = profile.kernel_version.clone().unwrap_or_default();
            self.set_kernel(name.clone(), version);
        }
        if let Some(px) = profile.display_shortest {
            self.set_display_length(DisplaySide::Shortest, px);
        }
        if let Some(px) = profile.display_longest {
            self.set_display_length(DisplaySide::Longest, px);
        }
        if let Some(gui) = profile.gui {
            self.set_gui_available(gui);
        }

        if let Some(controls) = &profile.controls {
            for (name, present) in controls {
                let kind: ControlKind = name.parse().map_err(SystemInfoError::from)?;
                self.set_input_control(kind, *present);
            }
        }

        match profile.internet {
            Some(InternetMode::Offline) => self.set_internet(InternetConnectivity::Offline),
            Some(InternetMode::Online) => self.set_internet(InternetConnectivity::Online {
                bandwidth_mbitps: profile.bandwidth_mbitps,
            }),
            None if profile.bandwidth_mbitps.is_some() => {
                debug!("bandwidth_mbitps ignored without internet = \"online\"");
            }
            None => {}
        }

        if let Some(path) = profile.os_release_path()? {
            self.load_os_release(&path)?;
        }

        Ok(())
    }
}
