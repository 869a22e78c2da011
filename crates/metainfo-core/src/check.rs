//! Evaluates a single relation against a [`SystemInfo`].

use std::fmt;

use metainfo_utils::{compare::Compare, vercmp::vercmp};
use tracing::trace;

use crate::{
    error::{RelationError, RelationResult},
    relation::{ControlKind, InternetKind, Relation, RelationValue},
    system_info::{ControlState, InternetConnectivity, SystemInfo},
};

/// Outcome of checking a relation.
///
/// Only `Satisfied` counts as a pass; `Unknown` means the system could not
/// tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationStatus {
    Unknown,
    Error,
    NotSatisfied,
    Satisfied,
}

impl RelationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationStatus::Unknown => "unknown",
            RelationStatus::Error => "error",
            RelationStatus::NotSatisfied => "not-satisfied",
            RelationStatus::Satisfied => "satisfied",
        }
    }
}

impl fmt::Display for RelationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationCheckResult {
    pub status: RelationStatus,
    pub message: String,
}

impl RelationCheckResult {
    pub fn new(status: RelationStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn satisfied(message: impl Into<String>) -> Self {
        Self::new(RelationStatus::Satisfied, message)
    }

    fn not_satisfied(message: impl Into<String>) -> Self {
        Self::new(RelationStatus::NotSatisfied, message)
    }

    fn unknown(message: impl Into<String>) -> Self {
        Self::new(RelationStatus::Unknown, message)
    }

    fn from_bool(ok: bool, yes: impl Into<String>, no: impl Into<String>) -> Self {
        if ok {
            Self::satisfied(yes)
        } else {
            Self::not_satisfied(no)
        }
    }

    /// Turns a failed check into an `Error` result for reporting.
    pub fn from_error(err: &RelationError) -> Self {
        Self::new(RelationStatus::Error, err.to_string())
    }

    pub fn is_satisfied(&self) -> bool {
        self.status == RelationStatus::Satisfied
    }
}

/// A component known to be installed or available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub id: String,
    pub version: Option<String>,
}

impl ComponentRecord {
    pub fn new(id: impl Into<String>, version: Option<String>) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }
}

/// Lookup of components by id, used for `id` relations.
pub trait ComponentRegistry {
    fn components_by_id(&self, id: &str) -> Vec<&ComponentRecord>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    components: Vec<ComponentRecord>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: ComponentRecord) {
        self.components.push(record);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromIterator<ComponentRecord> for InMemoryRegistry {
    fn from_iter<I: IntoIterator<Item = ComponentRecord>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl ComponentRegistry for InMemoryRegistry {
    fn components_by_id(&self, id: &str) -> Vec<&ComponentRecord> {
        self.components.iter().filter(|c| c.id == id).collect()
    }
}

/// Checks whether the system described by `sysinfo` fulfils `relation`.
///
/// Probe failures and relations that can not be evaluated at all are
/// errors. An answer the system can not give is a result with
/// [`RelationStatus::Unknown`].
pub fn is_satisfied(
    relation: &Relation,
    sysinfo: &mut SystemInfo,
    registry: Option<&dyn ComponentRegistry>,
) -> RelationResult<RelationCheckResult> {
    let compare = relation.compare();

    let result = match relation.value() {
        RelationValue::Memory(required) => {
            let total = sysinfo.memory_total_mib()?;
            RelationCheckResult::from_bool(
                compare.holds(&total, required),
                format!("System memory is sufficient ({total} MiB)."),
                format!(
                    "Physical memory of this device does not match: needs {} {required} MiB, has {total} MiB.",
                    compare.as_math()
                ),
            )
        }

        RelationValue::Modalias(glob) => {
            let found = sysinfo.has_device_matching_modalias(glob)?;
            RelationCheckResult::from_bool(
                found,
                format!("Found hardware that is supported by this software ({glob})."),
                format!("No hardware matching {glob} was found on this system."),
            )
        }

        RelationValue::Kernel(name) => check_kernel(relation, name, sysinfo)?,

        RelationValue::Id(id) => {
            let Some(registry) = registry else {
                return Err(RelationError::RegistryUnavailable(id.clone()));
            };
            check_component(relation, id, registry)
        }

        RelationValue::DisplayLength(length) => {
            let side = relation.display_side();
            let current = sysinfo.display_length(side);
            let required = length.pixels();
            if current == 0 {
                RelationCheckResult::unknown(format!(
                    "Unable to check display size: the {side} display side length is unknown."
                ))
            } else {
                RelationCheckResult::from_bool(
                    compare.holds(&current, &required),
                    format!("Display size is sufficient for this software ({current}px {side} side)."),
                    format!(
                        "Display size does not match: the {side} side needs {} {required}px, has {current}px.",
                        compare.as_math()
                    ),
                )
            }
        }

        RelationValue::Control(kind) => check_control(*kind, sysinfo)?,

        RelationValue::Internet {
            kind,
            bandwidth_mbitps,
        } => check_internet(*kind, *bandwidth_mbitps, compare, sysinfo),

        RelationValue::Firmware(_) | RelationValue::Unknown { .. } => {
            return Err(RelationError::UnsupportedItemKind(
                relation.item_kind().to_string(),
            ));
        }
    };

    trace!(%relation, status = %result.status, "checked relation");
    Ok(result)
}

fn check_kernel(
    relation: &Relation,
    name: &str,
    sysinfo: &mut SystemInfo,
) -> RelationResult<RelationCheckResult> {
    let current_name = sysinfo.kernel_name()?.to_string();
    if !current_name.eq_ignore_ascii_case(name) {
        return Ok(RelationCheckResult::not_satisfied(format!(
            "This software requires the {name} kernel, but this system runs {current_name}."
        )));
    }

    let Some(required) = relation.version() else {
        return Ok(RelationCheckResult::satisfied(format!(
            "Kernel {current_name} is supported."
        )));
    };

    let current_version = sysinfo.kernel_version()?;
    let compare = relation.compare();
    Ok(RelationCheckResult::from_bool(
        compare.matches(vercmp(current_version, required)),
        format!("Kernel {current_name} {current_version} is supported."),
        format!(
            "The kernel version does not match: {name} {} {required} is needed, system has {current_version}.",
            compare.as_symbols()
        ),
    ))
}

fn check_component(
    relation: &Relation,
    id: &str,
    registry: &dyn ComponentRegistry,
) -> RelationCheckResult {
    let candidates = registry.components_by_id(id);
    if candidates.is_empty() {
        return RelationCheckResult::not_satisfied(format!("Component {id} is not available."));
    }

    match candidates
        .iter()
        .find(|c| relation.version_compare(c.version.as_deref()))
    {
        Some(found) => RelationCheckResult::satisfied(match &found.version {
            Some(version) => format!("Found {id} {version}."),
            None => format!("Found {id}."),
        }),
        None => RelationCheckResult::not_satisfied(format!(
            "Component {id} is available, but not in version {} {}.",
            relation.compare().as_symbols(),
            relation.version().unwrap_or_default()
        )),
    }
}

fn check_control(kind: ControlKind, sysinfo: &mut SystemInfo) -> RelationResult<RelationCheckResult> {
    let result = match sysinfo.has_input_control(kind)? {
        ControlState::Present => {
            RelationCheckResult::satisfied(format!("Found {kind} input method on this system."))
        }
        ControlState::Absent => {
            RelationCheckResult::not_satisfied(format!("This system does not have {kind} input."))
        }
        ControlState::Untested if !kind.is_detectable() => RelationCheckResult::unknown(format!(
            "Unable to check for {kind} input: it can not be detected automatically."
        )),
        ControlState::Untested => {
            RelationCheckResult::unknown(format!("Unable to check for {kind} input."))
        }
    };
    Ok(result)
}

fn check_internet(
    kind: InternetKind,
    bandwidth: Option<u32>,
    compare: Compare,
    sysinfo: &SystemInfo,
) -> RelationCheckResult {
    if kind == InternetKind::OfflineOnly {
        return RelationCheckResult::satisfied("This software works without an internet connection.");
    }

    match (sysinfo.internet(), bandwidth) {
        (InternetConnectivity::Untested, _) => {
            RelationCheckResult::unknown("Unable to check for an internet connection.")
        }
        (InternetConnectivity::Offline, _) => RelationCheckResult::not_satisfied(match kind {
            InternetKind::FirstRun => "This software needs an internet connection for its first run.",
            _ => "This software needs an internet connection.",
        }),
        (
            InternetConnectivity::Online {
                bandwidth_mbitps: Some(current),
            },
            Some(required),
        ) => RelationCheckResult::from_bool(
            compare.holds(&current, &required),
            format!("Internet bandwidth is sufficient ({current} Mbit/s)."),
            format!(
                "Internet bandwidth does not match: needs {} {required} Mbit/s, has {current} Mbit/s.",
                compare.as_math()
            ),
        ),
        (InternetConnectivity::Online { .. }, _) => {
            RelationCheckResult::satisfied("An internet connection is available.")
        }
    }
}
