use std::fmt;

use tracing::debug;

use super::udev::DeviceDatabase;
use crate::{error::SystemInfoResult, relation::ControlKind};

/// What is known about one kind of input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlState {
    Present,
    Absent,
    /// Never detected nor set.
    Untested,
}

impl ControlState {
    pub fn from_found(found: bool) -> Self {
        if found {
            ControlState::Present
        } else {
            ControlState::Absent
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlState::Present => "present",
            ControlState::Absent => "absent",
            ControlState::Untested => "untested",
        })
    }
}

/// Probes the device database for every detectable control.
///
/// Console input is always reported present. Pointing devices are either
/// mice or touchpads. The first enumeration failure aborts the scan.
pub fn detect_input_controls(db: &dyn DeviceDatabase) -> SystemInfoResult<Vec<(ControlKind, bool)>> {
    let has = |property: &str| db.has_device_with_property(property, "1");

    let keyboard = has("ID_INPUT_KEYBOARD")?;
    let pointing = has("ID_INPUT_MOUSE")? || has("ID_INPUT_TOUCHPAD")?;
    let gamepad = has("ID_INPUT_JOYSTICK")?;
    let tablet = has("ID_INPUT_TABLET")?;
    let touch = has("ID_INPUT_TOUCHSCREEN")?;

    let found = vec![
        (ControlKind::Console, true),
        (ControlKind::Keyboard, keyboard),
        (ControlKind::Pointing, pointing),
        (ControlKind::Gamepad, gamepad),
        (ControlKind::Tablet, tablet),
        (ControlKind::Touch, touch),
    ];

    debug!(?found, "input control scan finished");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, path::Path};

    use super::*;
    use crate::{
        error::{SystemInfoError, SystemInfoResult},
        system_info::udev::DeviceProperties,
    };

    struct FakeDevices {
        properties: BTreeSet<&'static str>,
        broken: bool,
    }

    impl DeviceDatabase for FakeDevices {
        fn properties(&self, _syspath: &Path) -> SystemInfoResult<DeviceProperties> {
            Ok(DeviceProperties::new())
        }

        fn has_device_with_property(&self, key: &str, _value: &str) -> SystemInfoResult<bool> {
            if self.broken {
                return Err(SystemInfoError::Enumeration("broken".into()));
            }
            Ok(self.properties.contains(key))
        }
    }

    fn lookup(found: &[(ControlKind, bool)], kind: ControlKind) -> Option<bool> {
        found.iter().find(|(k, _)| *k == kind).map(|(_, v)| *v)
    }

    #[test]
    fn test_detects_keyboard_and_touchpad() {
        let db = FakeDevices {
            properties: BTreeSet::from(["ID_INPUT_KEYBOARD", "ID_INPUT_TOUCHPAD"]),
            broken: false,
        };
        let found = detect_input_controls(&db).unwrap();

        assert_eq!(lookup(&found, ControlKind::Console), Some(true));
        assert_eq!(lookup(&found, ControlKind::Keyboard), Some(true));
        assert_eq!(lookup(&found, ControlKind::Pointing), Some(true));
        assert_eq!(lookup(&found, ControlKind::Touch), Some(false));
        assert_eq!(lookup(&found, ControlKind::Gamepad), Some(false));
        assert_eq!(lookup(&found, ControlKind::Voice), None);
    }

    #[test]
    fn test_enumeration_failure_aborts() {
        let db = FakeDevices {
            properties: BTreeSet::new(),
            broken: true,
        };
        assert!(detect_input_controls(&db).is_err());
    }
}
