//! Device properties from sysfs and the udev runtime database.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, trace, warn};

use crate::error::{SystemInfoError, SystemInfoResult};

pub type DeviceProperties = BTreeMap<String, String>;

/// Source of per-device properties.
///
/// The default implementation reads udev's files directly; tests and
/// embedders can supply their own.
pub trait DeviceDatabase: Send {
    /// All properties of the device at `syspath`.
    fn properties(&self, syspath: &Path) -> SystemInfoResult<DeviceProperties>;

    /// Whether any known device carries `key=value`.
    fn has_device_with_property(&self, key: &str, value: &str) -> SystemInfoResult<bool>;
}

/// Reads `uevent` files from sysfs and `E:` records from `/run/udev/data`.
#[derive(Debug, Clone)]
pub struct UdevDatabase {
    data_dir: PathBuf,
}

impl UdevDatabase {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Name of the udev database record for a device: `c<maj>:<min>` or
    /// `b<maj>:<min>` for device nodes, `n<ifindex>` for network
    /// interfaces, `+<subsystem>:<sysname>` otherwise.
    fn record_id(syspath: &Path) -> Option<String> {
        let sysname = syspath.file_name()?.to_string_lossy().into_owned();
        let subsystem = fs::read_link(syspath.join("subsystem"))
            .ok()
            .and_then(|link| link.file_name().map(|n| n.to_string_lossy().into_owned()));

        if let Ok(dev) = fs::read_to_string(syspath.join("dev")) {
            let prefix = if subsystem.as_deref() == Some("block") { 'b' } else { 'c' };
            return Some(format!("{prefix}{}", dev.trim()));
        }

        let subsystem = subsystem?;
        if subsystem == "net" {
            if let Ok(ifindex) = fs::read_to_string(syspath.join("ifindex")) {
                return Some(format!("n{}", ifindex.trim()));
            }
        }
        Some(format!("+{subsystem}:{sysname}"))
    }
}

fn parse_uevent(content: &str, props: &mut DeviceProperties) {
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key.to_string(), value.to_string());
        }
    }
}

fn parse_udev_record(content: &str, props: &mut DeviceProperties) {
    for line in content.lines() {
        if let Some((key, value)) = line.strip_prefix("E:").and_then(|l| l.split_once('=')) {
            props.insert(key.to_string(), value.to_string());
        }
    }
}

impl DeviceDatabase for UdevDatabase {
    fn properties(&self, syspath: &Path) -> SystemInfoResult<DeviceProperties> {
        let mut props = DeviceProperties::new();

        let uevent = syspath.join("uevent");
        let content = fs::read_to_string(&uevent).map_err(|err| {
            SystemInfoError::io(
                format!("reading device information for {}", syspath.display()),
                err,
            )
        })?;
        parse_uevent(&content, &mut props);

        if let Some(id) = Self::record_id(syspath) {
            let record = self.data_dir.join(&id);
            match fs::read_to_string(&record) {
                Ok(content) => parse_udev_record(&content, &mut props),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    trace!("no udev record {id} for {}", syspath.display());
                }
                Err(err) => {
                    warn!("Unable to read udev record {}: {err}", record.display());
                }
            }
        }

        Ok(props)
    }

    fn has_device_with_property(&self, key: &str, value: &str) -> SystemInfoResult<bool> {
        let entries = fs::read_dir(&self.data_dir).map_err(|err| {
            SystemInfoError::Enumeration(format!("{}: {err}", self.data_dir.display()))
        })?;
        let wanted = format!("E:{key}={value}");

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) => {
                    if content.lines().any(|line| line == wanted) {
                        debug!("{key}={value} found on {}", path.display());
                        return Ok(true);
                    }
                }
                Err(err) => warn!("Unable to read udev record {}: {err}", path.display()),
            }
        }

        Ok(false)
    }
}
