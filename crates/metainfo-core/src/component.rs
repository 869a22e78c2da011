//! Component manifests: an id, an optional version and the component's
//! relations, stored as TOML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use metainfo_utils::{compare::Compare, error::ParseError};
use serde::Deserialize;
use tracing::debug;

use crate::{
    check::ComponentRecord,
    error::{ManifestError, ManifestResult, MetainfoError},
    relation::{
        parse_version_requirement, DisplayLength, DisplaySide, Relation, RelationKind,
        RelationValue,
    },
    MetainfoResult,
};

/// Display lengths may be given in pixels or as a size class name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LengthEntry {
    Pixels(u32),
    Named(String),
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RelationEntry {
    memory: Option<u64>,
    modalias: Option<String>,
    kernel: Option<String>,
    id: Option<String>,
    firmware: Option<String>,
    control: Option<String>,
    display_length: Option<LengthEntry>,
    internet: Option<String>,

    version: Option<String>,
    compare: Option<String>,
    side: Option<String>,
    bandwidth_mbitps: Option<u32>,
}

impl RelationEntry {
    fn item_count(&self) -> usize {
        [
            self.memory.is_some(),
            self.modalias.is_some(),
            self.kernel.is_some(),
            self.id.is_some(),
            self.firmware.is_some(),
            self.control.is_some(),
            self.display_length.is_some(),
            self.internet.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    fn value(self) -> Result<RelationValue, ParseError> {
        let value = if let Some(mib) = self.memory {
            RelationValue::Memory(mib)
        } else if let Some(glob) = self.modalias {
            RelationValue::Modalias(glob)
        } else if let Some(name) = self.kernel {
            RelationValue::Kernel(name)
        } else if let Some(id) = self.id {
            RelationValue::Id(id)
        } else if let Some(firmware) = self.firmware {
            RelationValue::Firmware(firmware)
        } else if let Some(control) = self.control {
            RelationValue::Control(control.parse()?)
        } else if let Some(length) = self.display_length {
            RelationValue::DisplayLength(match length {
                LengthEntry::Pixels(px) => DisplayLength::Pixels(px),
                LengthEntry::Named(name) => name.parse()?,
            })
        } else if let Some(internet) = self.internet {
            RelationValue::Internet {
                kind: internet.parse()?,
                bandwidth_mbitps: self.bandwidth_mbitps,
            }
        } else {
            return Err(ParseError::Empty { kind: "relation item" });
        };
        Ok(value)
    }

    fn into_relation(self, kind: RelationKind, index: usize) -> ManifestResult<Relation> {
        let section = kind.as_str();
        let found = self.item_count();
        if found != 1 {
            return Err(ManifestError::ItemCount {
                kind: section,
                index,
                found,
            });
        }
        let value_error = |source: ParseError| ManifestError::Value {
            kind: section,
            index,
            source,
        };

        let requirement = match &self.version {
            Some(version) => parse_version_requirement(version).map_err(value_error)?,
            None => None,
        };
        let compare = self
            .compare
            .as_deref()
            .map(str::parse::<Compare>)
            .transpose()
            .map_err(value_error)?;
        let side = self
            .side
            .as_deref()
            .map(str::parse::<DisplaySide>)
            .transpose()
            .map_err(value_error)?;

        let mut relation = Relation::new(kind, self.value().map_err(value_error)?);
        match (requirement, compare) {
            (Some(_), Some(_)) => {
                return Err(ManifestError::ConflictingCompare {
                    kind: section,
                    index,
                });
            }
            (Some((compare, version)), None) => {
                relation = relation.with_compare(compare).with_version(version);
            }
            (None, Some(compare)) => relation = relation.with_compare(compare),
            (None, None) => {}
        }
        if let Some(side) = side {
            relation = relation.with_display_side(side);
        }
        Ok(relation)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComponent {
    id: String,
    version: Option<String>,
    name: Option<String>,
    #[serde(default)]
    requires: Vec<RelationEntry>,
    #[serde(default)]
    recommends: Vec<RelationEntry>,
    #[serde(default)]
    supports: Vec<RelationEntry>,
}

/// A software component and the relations it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: String,
    pub version: Option<String>,
    pub name: Option<String>,
    pub relations: Vec<Relation>,
}

impl Component {
    /// Decodes a manifest. `origin` is only used in error messages.
    pub fn from_toml(content: &str, origin: &Path) -> ManifestResult<Self> {
        let raw: RawComponent = toml::from_str(content).map_err(|source| ManifestError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut relations = Vec::new();
        for (kind, entries) in [
            (RelationKind::Requires, raw.requires),
            (RelationKind::Recommends, raw.recommends),
            (RelationKind::Supports, raw.supports),
        ] {
            for (idx, entry) in entries.into_iter().enumerate() {
                relations.push(entry.into_relation(kind, idx + 1)?);
            }
        }

        Ok(Self {
            id: raw.id,
            version: raw.version,
            name: raw.name,
            relations,
        })
    }

    pub fn load(path: &Path) -> MetainfoResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| MetainfoError::IoError {
            action: format!("reading manifest {}", path.display()),
            source,
        })?;
        let component = Self::from_toml(&content, path)?;
        debug!(
            id = %component.id,
            relations = component.relations.len(),
            "loaded manifest {}",
            path.display()
        );
        Ok(component)
    }

    /// Loads several manifests, failing on the first broken one.
    pub fn load_all(paths: &[PathBuf]) -> MetainfoResult<Vec<Self>> {
        paths.iter().map(|path| Self::load(path)).collect()
    }

    pub fn relations_of(&self, kind: RelationKind) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(move |r| r.kind() == kind)
    }

    pub fn to_record(&self) -> ComponentRecord {
        ComponentRecord::new(self.id.clone(), self.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::relation::{ControlKind, DisplaySize, InternetKind, ItemKind};

    const MANIFEST: &str = r#"
id = "org.example.App"
version = "1.2"
name = "Example"

[[requires]]
kernel = "Linux"
version = ">= 6.2"

[[requires]]
id = "org.freedesktop.Platform"
version = ">>22.08"

[[recommends]]
memory = 2500

[[recommends]]
display_length = "large"
side = "longest"
compare = "ge"

[[recommends]]
display_length = 600
compare = "<="

[[supports]]
control = "touch"

[[recommends]]
internet = "always"
bandwidth_mbitps = 2
"#;

    fn parse(content: &str) -> ManifestResult<Component> {
        Component::from_toml(content, Path::new("test.toml"))
    }

    #[test]
    fn test_parse_manifest() {
        let component = parse(MANIFEST).unwrap();
        assert_eq!(component.id, "org.example.App");
        assert_eq!(component.version.as_deref(), Some("1.2"));
        assert_eq!(component.relations.len(), 7);

        let requires: Vec<_> = component.relations_of(RelationKind::Requires).collect();
        assert_eq!(requires[0].value_str(), Some("Linux"));
        assert_eq!(requires[0].version(), Some("6.2"));
        assert_eq!(requires[0].compare(), Compare::Ge);
        assert_eq!(requires[1].compare(), Compare::Gt);
        assert_eq!(requires[1].version(), Some("22.08"));

        let recommends: Vec<_> = component.relations_of(RelationKind::Recommends).collect();
        assert_eq!(recommends[0].value_int(), Some(2500));
        assert_eq!(
            recommends[1].value_display_length(),
            Some(DisplayLength::Size(DisplaySize::Large))
        );
        assert_eq!(recommends[1].display_side(), DisplaySide::Longest);
        assert_eq!(recommends[2].value_int(), Some(600));
        assert_eq!(recommends[2].compare(), Compare::Le);
        assert_eq!(
            recommends[3].value(),
            &RelationValue::Internet {
                kind: InternetKind::Always,
                bandwidth_mbitps: Some(2)
            }
        );

        let supports: Vec<_> = component.relations_of(RelationKind::Supports).collect();
        assert_eq!(supports[0].value_control_kind(), Some(ControlKind::Touch));
    }

    #[test]
    fn test_firmware_is_decoded() {
        let component = parse("id = \"x\"\n[[requires]]\nfirmware = \"runtime\"\nversion = \">=1.0\"\n").unwrap();
        assert_eq!(component.relations[0].item_kind(), ItemKind::Firmware);
    }

    #[test]
    fn test_entry_needs_exactly_one_item() {
        let err = parse("id = \"x\"\n[[requires]]\nmemory = 1\nkernel = \"Linux\"\n").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ItemCount {
                kind: "requires",
                index: 1,
                found: 2
            }
        ));

        let err = parse("id = \"x\"\n[[supports]]\ncontrol = \"touch\"\n[[supports]]\nversion = \">= 1\"\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::ItemCount { index: 2, found: 0, .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = parse("id = \"x\"\n[[requires]]\nhardware = \"usb:*\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::Toml { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = parse("id = \"x\"\n[[supports]]\ncontrol = \"joystick\"\n").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Value {
                source: ParseError::UnknownValue { .. },
                ..
            }
        ));

        let err = parse("id = \"x\"\n[[requires]]\nkernel = \"Linux\"\nversion = \"~>6\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::Value { .. }));
    }

    #[test]
    fn test_short_version_is_ignored() {
        let component = parse("id = \"x\"\n[[requires]]\nkernel = \"Linux\"\nversion = \">=\"\n").unwrap();
        assert_eq!(component.relations[0].version(), None);
    }

    #[test]
    fn test_conflicting_compare() {
        let err = parse("id = \"x\"\n[[requires]]\nkernel = \"Linux\"\nversion = \">= 6\"\ncompare = \"lt\"\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::ConflictingCompare { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, MANIFEST).unwrap();

        let component = Component::load(&path).unwrap();
        assert_eq!(component.to_record(), ComponentRecord::new("org.example.App", Some("1.2".into())));

        let missing = Component::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, MetainfoError::IoError { .. }));
    }
}
