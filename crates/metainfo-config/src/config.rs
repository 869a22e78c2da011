use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use documented::{Documented, DocumentedFields};
use metainfo_utils::path::{expand_path, xdg_config_home};
use serde::{Deserialize, Serialize};
use toml_edit::{DocumentMut, Item};
use tracing::{debug, info};

use crate::{
    annotations::annotate_table,
    error::{ConfigError, Result},
    profile::{DeviceProfile, InternetMode},
};

pub const CONFIG_ENV: &str = "METAINFO_CONFIG";

const DEFAULT_OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];
const DEFAULT_SYSFS_DEVICES: &str = "/sys/devices";
const DEFAULT_UDEV_DATA: &str = "/run/udev/data";
const DEFAULT_HWDB_PATHS: [&str; 2] = ["/usr/lib/udev/hwdb.d", "/etc/udev/hwdb.d"];

/// metainfo configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Profile used when none is passed on the command line.
    /// When unset, the running system is probed instead.
    pub default_profile: Option<String>,

    /// OS identity files; the first readable one is used.
    /// Default: ["/etc/os-release", "/usr/lib/os-release"]
    pub os_release_paths: Option<Vec<String>>,

    /// Root of the sysfs device tree scanned for modalias files.
    /// Default: /sys/devices
    pub sysfs_devices_path: Option<String>,

    /// Directory holding the udev runtime database.
    /// Default: /run/udev/data
    pub udev_data_path: Option<String>,

    /// Directories holding udev hwdb source files (*.hwdb).
    /// Default: ["/usr/lib/udev/hwdb.d", "/etc/udev/hwdb.d"]
    pub hwdb_paths: Option<Vec<String>>,

    /// Named device profiles, usable with `--profile <name>`.
    #[serde(default)]
    pub profile: BTreeMap<String, DeviceProfile>,
}

/// Filesystem locations the system probes read from, after expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbePaths {
    pub os_release: Vec<PathBuf>,
    pub sysfs_devices: PathBuf,
    pub udev_data: PathBuf,
    pub hwdb: Vec<PathBuf>,
}

impl Default for ProbePaths {
    fn default() -> Self {
        Self {
            os_release: DEFAULT_OS_RELEASE_PATHS.iter().map(PathBuf::from).collect(),
            sysfs_devices: PathBuf::from(DEFAULT_SYSFS_DEVICES),
            udev_data: PathBuf::from(DEFAULT_UDEV_DATA),
            hwdb: DEFAULT_HWDB_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Location of the configuration file: `$METAINFO_CONFIG`, else
/// `$XDG_CONFIG_HOME/metainfo/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(xdg_config_home()?.join("metainfo").join("config.toml")),
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Configuration written by `defconfig`: explicit probe paths plus two
    /// sample profiles.
    pub fn default_config() -> Self {
        let desktop = DeviceProfile {
            chassis: Some("desktop".into()),
            internet: Some(InternetMode::Online),
            ..Default::default()
        };
        let phone = DeviceProfile {
            chassis: Some("handset".into()),
            memory_mib: Some(4096),
            display_shortest: Some(360),
            display_longest: Some(760),
            controls: Some(BTreeMap::from([
                ("touch".to_string(), true),
                ("voice".to_string(), true),
            ])),
            internet: Some(InternetMode::Online),
            bandwidth_mbitps: Some(10),
            ..Default::default()
        };

        Self {
            default_profile: None,
            os_release_paths: Some(to_owned_list(&DEFAULT_OS_RELEASE_PATHS)),
            sysfs_devices_path: Some(DEFAULT_SYSFS_DEVICES.into()),
            udev_data_path: Some(DEFAULT_UDEV_DATA.into()),
            hwdb_paths: Some(to_owned_list(&DEFAULT_HWDB_PATHS)),
            profile: BTreeMap::from([("desktop".to_string(), desktop), ("phone".to_string(), phone)]),
        }
    }

    /// Loads the configuration from [`config_path`].
    pub fn new() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads and validates `path`. A missing file yields an empty
    /// configuration, which probes the live system with default paths.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        if let Some(name) = &self.default_profile {
            if !self.profile.contains_key(name) {
                return Err(ConfigError::MissingDefaultProfile(name.clone()));
            }
        }

        for (name, profile) in &self.profile {
            profile.validate(name)?;
        }

        Ok(())
    }

    pub fn get_profile(&self, name: &str) -> Result<&DeviceProfile> {
        self.profile
            .get(name)
            .ok_or_else(|| ConfigError::MissingProfile(name.to_string()))
    }

    /// Picks the profile named on the command line, falling back to
    /// `default_profile`. `None` means "probe the running system".
    pub fn active_profile<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Result<Option<(&'a str, &'a DeviceProfile)>> {
        match requested.or(self.default_profile.as_deref()) {
            Some(name) => Ok(Some((name, self.get_profile(name)?))),
            None => Ok(None),
        }
    }

    pub fn probe_paths(&self) -> Result<ProbePaths> {
        let defaults = ProbePaths::default();

        let expand_all = |paths: &Option<Vec<String>>, fallback: Vec<PathBuf>| -> Result<Vec<PathBuf>> {
            match paths {
                Some(paths) => paths
                    .iter()
                    .map(|p| expand_path(p).map_err(ConfigError::from))
                    .collect(),
                None => Ok(fallback),
            }
        };
        let expand_one = |path: &Option<String>, fallback: PathBuf| -> Result<PathBuf> {
            match path {
                Some(path) => Ok(expand_path(path)?),
                None => Ok(fallback),
            }
        };

        Ok(ProbePaths {
            os_release: expand_all(&self.os_release_paths, defaults.os_release)?,
            sysfs_devices: expand_one(&self.sysfs_devices_path, defaults.sysfs_devices)?,
            udev_data: expand_one(&self.udev_data_path, defaults.udev_data)?,
            hwdb: expand_all(&self.hwdb_paths, defaults.hwdb)?,
        })
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let rendered = toml::to_string_pretty(self)?;
        let mut doc = rendered.parse::<DocumentMut>()?;

        annotate_table::<Config>(doc.as_table_mut(), false)?;

        if let Some(profiles) = doc.get_mut("profile").and_then(Item::as_table_mut) {
            for (_, item) in profiles.iter_mut() {
                if let Item::Table(profile) = item {
                    annotate_table::<DeviceProfile>(profile, true)?;
                }
            }
        }

        Ok(doc)
    }
}

/// Writes the annotated default configuration to `path`.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.to_path_buf()));
    }

    let doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config_is_valid() {
        let mut config = Config::default_config();
        assert!(config.default_profile.is_none());
        assert!(config.profile.contains_key("desktop"));
        assert!(config.profile.contains_key("phone"));
        config.resolve().unwrap();
    }

    #[test]
    fn test_resolve_missing_default_profile() {
        let mut config = Config::default_config();
        config.default_profile = Some("nonexistent".into());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::MissingDefaultProfile(_))
        ));
    }

    #[test]
    fn test_active_profile() {
        let mut config = Config::default_config();
        assert!(config.active_profile(None).unwrap().is_none());

        let (name, profile) = config.active_profile(Some("phone")).unwrap().unwrap();
        assert_eq!(name, "phone");
        assert_eq!(profile.chassis.as_deref(), Some("handset"));

        config.default_profile = Some("desktop".into());
        let (name, _) = config.active_profile(None).unwrap().unwrap();
        assert_eq!(name, "desktop");

        assert!(matches!(
            config.active_profile(Some("tv")),
            Err(ConfigError::MissingProfile(_))
        ));
    }

    #[test]
    fn test_probe_paths_defaults() {
        let paths = Config::default().probe_paths().unwrap();
        assert_eq!(paths, ProbePaths::default());
        assert_eq!(paths.os_release[0], PathBuf::from("/etc/os-release"));
    }

    #[test]
    fn test_probe_paths_overrides() {
        let config = Config {
            sysfs_devices_path: Some("/tmp/fake/sys".into()),
            hwdb_paths: Some(vec!["/tmp/hwdb".into()]),
            ..Default::default()
        };
        let paths = config.probe_paths().unwrap();
        assert_eq!(paths.sysfs_devices, PathBuf::from("/tmp/fake/sys"));
        assert_eq!(paths.hwdb, vec![PathBuf::from("/tmp/hwdb")]);
        assert_eq!(paths.udev_data, PathBuf::from("/run/udev/data"));
    }

    #[test]
    fn test_load_missing_file_gives_empty_config() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.profile.is_empty());
        assert!(config.sysfs_devices_path.is_none());
    }

    #[test]
    fn test_load_rejects_bad_profile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[profile.bad]\ndisplay_shortest = 900\ndisplay_longest = 300\n",
        )
        .unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidDisplay { .. })
        ));
    }

    #[test]
    fn test_annotated_document_round_trips() {
        let doc = Config::default_config().to_annotated_document().unwrap();
        let text = doc.to_string();

        assert!(text.contains("# Root of the sysfs device tree"));
        assert!(text.contains("# Chassis template"));

        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.profile.len(), 2);
        assert_eq!(parsed.profile["phone"].memory_mib, Some(4096));
    }

    #[test]
    fn test_generate_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metainfo").join("config.toml");

        generate_default_config(&path).unwrap();
        assert!(path.exists());

        assert!(matches!(
            generate_default_config(&path),
            Err(ConfigError::ConfigAlreadyExists(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        with_env(&[(CONFIG_ENV, Some("/custom/metainfo.toml"))], || {
            assert_eq!(config_path().unwrap(), PathBuf::from("/custom/metainfo.toml"));
        });

        with_env(
            &[(CONFIG_ENV, None), ("XDG_CONFIG_HOME", Some("/xdg"))],
            || {
                assert_eq!(
                    config_path().unwrap(),
                    PathBuf::from("/xdg/metainfo/config.toml")
                );
            },
        );
    }
}
