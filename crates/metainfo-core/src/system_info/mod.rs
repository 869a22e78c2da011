//! Facts about the machine relations are checked against.
//!
//! Every probe runs at most once per [`SystemInfo`]; results are cached on
//! the instance and setters take priority over probing.

mod hwdb;
mod input;
mod kernel;
mod memory;
mod modalias;
mod os_release;
mod template;
mod udev;

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use fast_glob::glob_match;
use metainfo_config::config::ProbePaths;
use metainfo_utils::rdns::dns_to_rdns;
use tracing::{debug, warn};

pub use self::{
    hwdb::Hwdb,
    input::ControlState,
    kernel::KernelInfo,
    os_release::OsRelease,
    template::ChassisKind,
    udev::{DeviceDatabase, DeviceProperties, UdevDatabase},
};
use crate::{
    error::{SystemInfoError, SystemInfoResult},
    relation::{ControlKind, DisplaySide},
};

/// Network connectivity of the target system.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InternetConnectivity {
    #[default]
    Untested,
    Offline,
    Online { bandwidth_mbitps: Option<u32> },
}

impl fmt::Display for InternetConnectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternetConnectivity::Untested => f.write_str("untested"),
            InternetConnectivity::Offline => f.write_str("offline"),
            InternetConnectivity::Online {
                bandwidth_mbitps: Some(bw),
            } => write!(f, "online ({bw} Mbit/s)"),
            InternetConnectivity::Online { .. } => f.write_str("online"),
        }
    }
}

pub struct SystemInfo {
    paths: ProbePaths,
    devices: Box<dyn DeviceDatabase>,

    os: Option<OsRelease>,
    os_cid: Option<String>,
    kernel: Option<KernelInfo>,
    memory_total_mib: Option<u64>,
    display_shortest: u32,
    display_longest: u32,
    controls: BTreeMap<ControlKind, ControlState>,
    inputs_scanned: bool,
    modaliases: Option<BTreeMap<String, PathBuf>>,
    hwdb: Option<Hwdb>,
    gui_available: bool,
    internet: InternetConnectivity,
}

impl fmt::Debug for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemInfo")
            .field("paths", &self.paths)
            .field("os", &self.os)
            .field("kernel", &self.kernel)
            .field("memory_total_mib", &self.memory_total_mib)
            .field("display_shortest", &self.display_shortest)
            .field("display_longest", &self.display_longest)
            .field("controls", &self.controls)
            .field("gui_available", &self.gui_available)
            .field("internet", &self.internet)
            .finish_non_exhaustive()
    }
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInfo {
    /// Probes the running system from the standard locations.
    pub fn new() -> Self {
        Self::with_paths(ProbePaths::default())
    }

    pub fn with_paths(paths: ProbePaths) -> Self {
        let devices = Box::new(UdevDatabase::new(&paths.udev_data));
        Self::with_device_database(paths, devices)
    }

    pub fn with_device_database(paths: ProbePaths, devices: Box<dyn DeviceDatabase>) -> Self {
        Self {
            paths,
            devices,
            os: None,
            os_cid: None,
            kernel: None,
            memory_total_mib: None,
            display_shortest: 0,
            display_longest: 0,
            controls: BTreeMap::new(),
            inputs_scanned: false,
            modaliases: None,
            hwdb: None,
            gui_available: true,
            internet: InternetConnectivity::Untested,
        }
    }

    pub fn probe_paths(&self) -> &ProbePaths {
        &self.paths
    }

    /// Reads OS identity from `path`, unless an OS id is already known.
    pub fn load_os_release(&mut self, path: &Path) -> SystemInfoResult<()> {
        if self.os.as_ref().is_some_and(|os| os.id.is_some()) {
            return Ok(());
        }
        self.os = Some(OsRelease::load(path)?);
        self.os_cid = None;
        Ok(())
    }

    fn os_release(&mut self) -> &OsRelease {
        let os = match self.os.take() {
            Some(os) => os,
            None => {
                let loaded = self.paths.os_release.iter().find_map(|path| {
                    match OsRelease::load(path) {
                        Ok(os) => {
                            debug!("read OS identity from {}", path.display());
                            Some(os)
                        }
                        Err(err) => {
                            debug!("{err}");
                            None
                        }
                    }
                });
                loaded.unwrap_or_else(|| {
                    warn!("Unable to read OS identity from any os-release file");
                    OsRelease::default()
                })
            }
        };
        self.os.insert(os)
    }

    pub fn os_id(&mut self) -> Option<&str> {
        self.os_release().id.as_deref()
    }

    pub fn os_name(&mut self) -> Option<&str> {
        self.os_release().name.as_deref()
    }

    pub fn os_version(&mut self) -> Option<&str> {
        self.os_release().version_id.as_deref()
    }

    pub fn os_homepage(&mut self) -> Option<&str> {
        self.os_release().home_url.as_deref()
    }

    /// Reverse-DNS component id of the OS, derived from its homepage and id.
    /// Falls back to the plain id when the homepage has no usable host.
    pub fn os_component_id(&mut self) -> Option<&str> {
        if self.os_cid.is_none() {
            let os = self.os_release();
            let cid = match &os.home_url {
                Some(home) => dns_to_rdns(home, os.id.as_deref()).or_else(|| os.id.clone()),
                None => os.id.clone(),
            };
            self.os_cid = cid;
        }
        self.os_cid.as_deref()
    }

    fn kernel(&mut self) -> SystemInfoResult<&KernelInfo> {
        let kernel = match self.kernel.take() {
            Some(kernel) => kernel,
            None => KernelInfo::from_uname()?,
        };
        let kernel: &KernelInfo = self.kernel.insert(kernel);
        Ok(kernel)
    }

    pub fn kernel_name(&mut self) -> SystemInfoResult<&str> {
        Ok(&self.kernel()?.name)
    }

    pub fn kernel_version(&mut self) -> SystemInfoResult<&str> {
        Ok(&self.kernel()?.version)
    }

    pub fn set_kernel(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.kernel = Some(KernelInfo::new(name, version));
    }

    pub fn memory_total_mib(&mut self) -> SystemInfoResult<u64> {
        if let Some(mib) = self.memory_total_mib {
            return Ok(mib);
        }
        let mib = memory::total_memory_mib()?;
        debug!("total memory: {mib} MiB");
        Ok(*self.memory_total_mib.insert(mib))
    }

    pub fn set_memory_total(&mut self, mib: u64) {
        self.memory_total_mib = Some(mib);
    }

    /// Display side length in logical pixels; 0 when unknown.
    pub fn display_length(&self, side: DisplaySide) -> u32 {
        match side {
            DisplaySide::Shortest => self.display_shortest,
            DisplaySide::Longest => self.display_longest,
        }
    }

    pub fn set_display_length(&mut self, side: DisplaySide, px: u32) {
        match side {
            DisplaySide::Shortest => self.display_shortest = px,
            DisplaySide::Longest => self.display_longest = px,
        }
    }

    fn scan_input_controls(&mut self) -> SystemInfoResult<()> {
        if self.inputs_scanned {
            return Ok(());
        }
        self.inputs_scanned = true;

        for (kind, found) in input::detect_input_controls(self.devices.as_ref())? {
            self.controls
                .entry(kind)
                .or_insert(ControlState::from_found(found));
        }
        Ok(())
    }

    /// Whether the system has the given input control.
    ///
    /// Runs the one-time device scan unless the kind was set explicitly.
    /// Kinds that were never detected nor set are `Untested`.
    pub fn has_input_control(&mut self, kind: ControlKind) -> SystemInfoResult<ControlState> {
        if let Some(state) = self.controls.get(&kind) {
            return Ok(*state);
        }
        self.scan_input_controls()?;
        Ok(self
            .controls
            .get(&kind)
            .copied()
            .unwrap_or(ControlState::Untested))
    }

    pub fn set_input_control(&mut self, kind: ControlKind, present: bool) {
        self.controls.insert(kind, ControlState::from_found(present));
    }

    /// Marks every control not set so far as absent and disables scanning.
    pub(crate) fn mark_controls_tested(&mut self) {
        self.inputs_scanned = true;
        for kind in ControlKind::ALL {
            self.controls.entry(*kind).or_insert(ControlState::Absent);
        }
    }

    /// All modaliases of the system mapped to their sysfs directory.
    pub fn modaliases(&mut self) -> SystemInfoResult<&BTreeMap<String, PathBuf>> {
        let map = match self.modaliases.take() {
            Some(map) => map,
            None => modalias::scan_modaliases(&self.paths.sysfs_devices),
        };
        let map: &BTreeMap<String, PathBuf> = self.modaliases.insert(map);
        Ok(map)
    }

    pub fn modalias_to_syspath(&mut self, modalias: &str) -> SystemInfoResult<Option<&Path>> {
        Ok(self.modaliases()?.get(modalias).map(PathBuf::as_path))
    }

    /// Whether any device's modalias matches the shell-style `glob`.
    pub fn has_device_matching_modalias(&mut self, glob: &str) -> SystemInfoResult<bool> {
        Ok(self
            .modaliases()?
            .keys()
            .any(|modalias| modalias == glob || glob_match(glob, modalias)))
    }

    fn hwdb(&mut self) -> SystemInfoResult<&Hwdb> {
        let hwdb = match self.hwdb.take() {
            Some(hwdb) => hwdb,
            None => Hwdb::load(&self.paths.hwdb)?,
        };
        let hwdb: &Hwdb = self.hwdb.insert(hwdb);
        Ok(hwdb)
    }

    /// Human readable `vendor - model` name for a modalias.
    ///
    /// Live devices are described from their properties, anything else from
    /// the hardware database. With `allow_fallback` the driver or the
    /// modalias itself stands in when no description exists; without it
    /// that case is [`SystemInfoError::NotFound`].
    pub fn device_name_for_modalias(
        &mut self,
        modalias: &str,
        allow_fallback: bool,
    ) -> SystemInfoResult<String> {
        let syspath = self.modalias_to_syspath(modalias)?.map(Path::to_path_buf);
        match syspath {
            Some(syspath) => self.device_name_from_syspath(&syspath, modalias, allow_fallback),
            None => self.device_name_from_hwdb(modalias, allow_fallback),
        }
    }

    fn device_name_from_syspath(
        &self,
        syspath: &Path,
        modalias: &str,
        allow_fallback: bool,
    ) -> SystemInfoResult<String> {
        let props = self.devices.properties(syspath)?;
        let mut vendor = None;
        let mut model = None;
        let mut usb_class = None;
        let mut driver = None;

        for (key, value) in &props {
            if key.contains("_VENDOR") {
                if !key.contains("VENDOR_ID") && !key.ends_with("_ENC") {
                    vendor = Some(value);
                }
            } else if key.contains("_MODEL") {
                if !key.contains("MODEL_ID") && !key.ends_with("_ENC") {
                    model = Some(value);
                }
            } else if key == "DRIVER" {
                driver = Some(value);
            } else if key.contains("_USB_CLASS") {
                usb_class = Some(value);
            }
        }

        if let Some(vendor) = vendor {
            if let Some(detail) = model.or(usb_class) {
                return Ok(format!("{vendor} - {detail}"));
            }
        }
        if allow_fallback {
            return Ok(driver.cloned().unwrap_or_else(|| modalias.to_string()));
        }
        Err(SystemInfoError::NotFound(modalias.to_string()))
    }

    fn device_name_from_hwdb(
        &mut self,
        modalias: &str,
        allow_fallback: bool,
    ) -> SystemInfoResult<String> {
        let props = self.hwdb()?.lookup(modalias);
        if let (Some(vendor), Some(model)) = (props.get(hwdb::VENDOR_KEY), props.get(hwdb::MODEL_KEY)) {
            return Ok(format!("{vendor} - {model}"));
        }
        if allow_fallback {
            return Ok(modalias.to_string());
        }
        Err(SystemInfoError::NotFound(modalias.to_string()))
    }

    pub fn gui_available(&self) -> bool {
        self.gui_available
    }

    pub fn set_gui_available(&mut self, available: bool) {
        self.gui_available = available;
    }

    pub fn internet(&self) -> InternetConnectivity {
        self.internet
    }

    pub fn set_internet(&mut self, internet: InternetConnectivity) {
        self.internet = internet;
    }
}
