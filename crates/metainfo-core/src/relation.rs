//! Requirement, recommendation and support statements of a component.

use std::{fmt, str::FromStr};

use metainfo_utils::{
    compare::Compare,
    error::{ParseError, ParseResult},
    vercmp::{compare_versions, VercmpFlags},
};

/// Generates `as_str`, `ALL`, `Display` and `FromStr` for a fieldless enum
/// with a fixed textual form per variant.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> ParseResult<Self> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(ParseError::Empty { kind: $kind });
                }
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ParseError::UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Requires,
    Recommends,
    Supports,
}

string_enum!(RelationKind, "relation kind", {
    Requires => "requires",
    Recommends => "recommends",
    Supports => "supports",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Id,
    Modalias,
    Kernel,
    Memory,
    Firmware,
    Control,
    DisplayLength,
    Internet,
    Unknown,
}

string_enum!(ItemKind, "item kind", {
    Id => "id",
    Modalias => "modalias",
    Kernel => "kernel",
    Memory => "memory",
    Firmware => "firmware",
    Control => "control",
    DisplayLength => "display_length",
    Internet => "internet",
    Unknown => "unknown",
});

/// Ways a user can interact with a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKind {
    Pointing,
    Keyboard,
    Console,
    Touch,
    Gamepad,
    Tablet,
    Voice,
    Vision,
    TvRemote,
}

string_enum!(ControlKind, "control kind", {
    Pointing => "pointing",
    Keyboard => "keyboard",
    Console => "console",
    Touch => "touch",
    Gamepad => "gamepad",
    Tablet => "tablet",
    Voice => "voice",
    Vision => "vision",
    TvRemote => "tv-remote",
});

impl ControlKind {
    /// Controls the device scan can find. The rest are only ever known when
    /// set explicitly.
    pub fn is_detectable(self) -> bool {
        !matches!(
            self,
            ControlKind::Voice | ControlKind::Vision | ControlKind::TvRemote
        )
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySide {
    #[default]
    Shortest,
    Longest,
}

string_enum!(DisplaySide, "display side", {
    Shortest => "shortest",
    Longest => "longest",
});

/// Symbolic display size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySize {
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
}

string_enum!(DisplaySize, "display size", {
    XSmall => "xsmall",
    Small => "small",
    Medium => "medium",
    Large => "large",
    XLarge => "xlarge",
});

impl DisplaySize {
    /// Logical pixel threshold of the class.
    pub fn pixels(self) -> u32 {
        match self {
            DisplaySize::XSmall => 360,
            DisplaySize::Small => 420,
            DisplaySize::Medium => 760,
            DisplaySize::Large => 900,
            DisplaySize::XLarge => 1200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayLength {
    Pixels(u32),
    Size(DisplaySize),
}

impl DisplayLength {
    pub fn pixels(self) -> u32 {
        match self {
            DisplayLength::Pixels(px) => px,
            DisplayLength::Size(size) => size.pixels(),
        }
    }
}

impl FromStr for DisplayLength {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        let s = s.trim();
        match s.parse::<u32>() {
            Ok(px) => Ok(DisplayLength::Pixels(px)),
            Err(_) => s.parse().map(DisplayLength::Size),
        }
    }
}

impl fmt::Display for DisplayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayLength::Pixels(px) => write!(f, "{px}px"),
            DisplayLength::Size(size) => write!(f, "{size} ({}px)", size.pixels()),
        }
    }
}

/// When a component needs network access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternetKind {
    /// Never touches the network.
    OfflineOnly,
    Always,
    /// Online only for initial setup.
    FirstRun,
}

string_enum!(InternetKind, "internet kind", {
    OfflineOnly => "offline-only",
    Always => "always",
    FirstRun => "first-run",
});

/// Value of a relation; the variant fixes the item kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
    /// Physical memory in MiB.
    Memory(u64),
    /// Modalias glob.
    Modalias(String),
    /// Kernel name, e.g. "Linux".
    Kernel(String),
    /// Component id.
    Id(String),
    Firmware(String),
    Control(ControlKind),
    DisplayLength(DisplayLength),
    Internet {
        kind: InternetKind,
        bandwidth_mbitps: Option<u32>,
    },
    /// An item this library does not know, kept for round-tripping.
    Unknown { item: String, value: String },
}

impl RelationValue {
    pub fn item_kind(&self) -> ItemKind {
        match self {
            RelationValue::Memory(_) => ItemKind::Memory,
            RelationValue::Modalias(_) => ItemKind::Modalias,
            RelationValue::Kernel(_) => ItemKind::Kernel,
            RelationValue::Id(_) => ItemKind::Id,
            RelationValue::Firmware(_) => ItemKind::Firmware,
            RelationValue::Control(_) => ItemKind::Control,
            RelationValue::DisplayLength(_) => ItemKind::DisplayLength,
            RelationValue::Internet { .. } => ItemKind::Internet,
            RelationValue::Unknown { .. } => ItemKind::Unknown,
        }
    }
}

impl fmt::Display for RelationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationValue::Memory(mib) => write!(f, "{mib} MiB"),
            RelationValue::Modalias(s)
            | RelationValue::Kernel(s)
            | RelationValue::Id(s)
            | RelationValue::Firmware(s) => f.write_str(s),
            RelationValue::Control(kind) => write!(f, "{kind}"),
            RelationValue::DisplayLength(len) => write!(f, "{len}"),
            RelationValue::Internet {
                kind,
                bandwidth_mbitps: Some(bw),
            } => write!(f, "{kind} ({bw} Mbit/s)"),
            RelationValue::Internet { kind, .. } => write!(f, "{kind}"),
            RelationValue::Unknown { value, .. } => f.write_str(value),
        }
    }
}

/// Splits a `">= 1.2"` style version requirement into operator and version.
///
/// Inputs of two characters or less carry no version and yield `None`.
pub fn parse_version_requirement(s: &str) -> ParseResult<Option<(Compare, String)>> {
    if s.len() <= 2 {
        return Ok(None);
    }
    let (op, version) = match (s.get(..2), s.get(2..)) {
        (Some(op), Some(version)) => (op, version),
        _ => {
            return Err(ParseError::UnknownValue {
                kind: "comparison",
                value: s.to_string(),
            })
        }
    };
    Ok(Some((op.parse()?, version.trim().to_string())))
}

/// A single requires/recommends/supports statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    kind: RelationKind,
    value: RelationValue,
    compare: Compare,
    version: Option<String>,
    display_side: DisplaySide,
}

impl Relation {
    pub fn new(kind: RelationKind, value: RelationValue) -> Self {
        Self {
            kind,
            value,
            compare: Compare::default(),
            version: None,
            display_side: DisplaySide::default(),
        }
    }

    pub fn with_compare(mut self, compare: Compare) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_display_side(mut self, side: DisplaySide) -> Self {
        self.display_side = side;
        self
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn item_kind(&self) -> ItemKind {
        self.value.item_kind()
    }

    pub fn value(&self) -> &RelationValue {
        &self.value
    }

    pub fn compare(&self) -> Compare {
        self.compare
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn display_side(&self) -> DisplaySide {
        self.display_side
    }

    /// Integer value of memory and display-length relations.
    pub fn value_int(&self) -> Option<u64> {
        match &self.value {
            RelationValue::Memory(mib) => Some(*mib),
            RelationValue::DisplayLength(len) => Some(u64::from(len.pixels())),
            _ => None,
        }
    }

    /// String value of modalias, kernel, id and firmware relations.
    pub fn value_str(&self) -> Option<&str> {
        match &self.value {
            RelationValue::Modalias(s)
            | RelationValue::Kernel(s)
            | RelationValue::Id(s)
            | RelationValue::Firmware(s) => Some(s),
            _ => None,
        }
    }

    pub fn value_control_kind(&self) -> Option<ControlKind> {
        match self.value {
            RelationValue::Control(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn value_display_length(&self) -> Option<DisplayLength> {
        match self.value {
            RelationValue::DisplayLength(len) => Some(len),
            _ => None,
        }
    }

    /// Whether `version` fulfils this relation's version constraint, read
    /// as `version <compare> self.version`. A relation without a version is
    /// fulfilled by anything.
    pub fn version_compare(&self, version: Option<&str>) -> bool {
        match self.version.as_deref() {
            None => true,
            Some(required) => {
                self.compare
                    .matches(compare_versions(version, Some(required), VercmpFlags::NONE))
            }
        }
    }

    pub fn is_control(&self) -> bool {
        self.item_kind() == ItemKind::Control
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.item_kind())?;
        if self.item_kind() == ItemKind::DisplayLength {
            write!(f, " ({})", self.display_side)?;
        }
        match (&self.version, &self.value) {
            (Some(version), value) => {
                write!(f, " {value} {} {version}", self.compare.as_symbols())
            }
            (None, RelationValue::Memory(_) | RelationValue::DisplayLength(_)) => {
                write!(f, " {} {}", self.compare.as_symbols(), self.value)
            }
            (None, RelationValue::Internet { bandwidth_mbitps: Some(_), .. }) => {
                write!(f, " {} ({} bandwidth)", self.value, self.compare.as_symbols())
            }
            (None, value) => write!(f, " {value}"),
        }
    }
}
