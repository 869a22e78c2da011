use std::path::PathBuf;

use metainfo_config::config::Config;
use metainfo_core::{
    check::{ComponentRecord, InMemoryRegistry},
    component::Component,
    system_info::{ChassisKind, SystemInfo},
    MetainfoResult,
};
use tracing::debug;

/// The system relations are checked against, with a name for display.
pub struct Target {
    pub label: String,
    pub sysinfo: SystemInfo,
}

impl Target {
    pub fn chassis(chassis: ChassisKind) -> MetainfoResult<Self> {
        Ok(Self {
            label: chassis.to_string(),
            sysinfo: SystemInfo::for_chassis(chassis)?,
        })
    }

    /// Picks the target from `--chassis`, then the active profile, then the
    /// running system.
    pub fn select(
        config: &Config,
        profile: Option<&str>,
        chassis: Option<&str>,
    ) -> MetainfoResult<Self> {
        if let Some(chassis) = chassis {
            return Self::chassis(chassis.parse::<ChassisKind>()?);
        }

        let paths = config.probe_paths()?;
        match config.active_profile(profile)? {
            Some((name, profile)) => {
                debug!("using device profile {name}");
                Ok(Self {
                    label: format!("profile {name}"),
                    sysinfo: SystemInfo::from_profile(profile, paths)?,
                })
            }
            None => Ok(Self {
                label: "this system".into(),
                sysinfo: SystemInfo::with_paths(paths),
            }),
        }
    }
}

/// Components available for `id` relations: the given manifests plus the
/// operating system itself.
pub fn build_registry(with: &[PathBuf], sysinfo: &mut SystemInfo) -> MetainfoResult<InMemoryRegistry> {
    let mut registry: InMemoryRegistry = Component::load_all(with)?
        .iter()
        .map(Component::to_record)
        .collect();

    let os_version = sysinfo.os_version().map(str::to_string);
    if let Some(cid) = sysinfo.os_component_id() {
        registry.add(ComponentRecord::new(cid, os_version));
    }

    debug!("{} components available", registry.len());
    Ok(registry)
}
