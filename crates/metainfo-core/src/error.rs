//! Error types for metainfo-core.

use std::path::PathBuf;

use metainfo_config::error::ConfigError;
use metainfo_utils::error::ParseError;
use miette::Diagnostic;
use thiserror::Error;

/// Failures while probing the running system.
///
/// `NotFound` is the only variant that means "the query worked but had no
/// answer"; everything else means the answer could not be determined.
#[derive(Error, Diagnostic, Debug)]
pub enum SystemInfoError {
    #[error("Error while {action}")]
    #[diagnostic(
        code(metainfo_core::sysinfo::io),
        help("Check that the path exists and is readable")
    )]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read kernel information via uname")]
    #[diagnostic(code(metainfo_core::sysinfo::uname))]
    Uname(#[source] nix::errno::Errno),

    #[error("Unable to query total memory")]
    #[diagnostic(
        code(metainfo_core::sysinfo::memory),
        help("Set the memory size explicitly with a device profile")
    )]
    Memory,

    #[error("{0} is not supported on this platform")]
    #[diagnostic(
        code(metainfo_core::sysinfo::unsupported),
        help("Set the value explicitly or use a device profile")
    )]
    Unsupported(&'static str),

    #[error("Unable to enumerate devices: {0}")]
    #[diagnostic(
        code(metainfo_core::sysinfo::enumeration),
        help("Is udev running? The device database lives in /run/udev/data by default")
    )]
    Enumeration(String),

    #[error("Unable to open hardware database: {0}")]
    #[diagnostic(code(metainfo_core::sysinfo::hwdb))]
    Hwdb(String),

    #[error("Unable to find good human-readable description for device {0}")]
    #[diagnostic(code(metainfo_core::sysinfo::not_found))]
    NotFound(String),

    #[error("Unable to generate system info template for chassis type: {0}")]
    #[diagnostic(
        code(metainfo_core::sysinfo::chassis),
        help("Use one of: desktop, laptop, server, tablet, handset")
    )]
    UnsupportedChassis(String),

    #[error(transparent)]
    #[diagnostic(code(metainfo_core::sysinfo::parse))]
    Parse(#[from] ParseError),
}

impl SystemInfoError {
    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A relation that could not be evaluated at all.
#[derive(Error, Diagnostic, Debug)]
pub enum RelationError {
    #[error("Relations of item kind `{0}` can not be checked")]
    #[diagnostic(
        code(metainfo_core::relation::unsupported_item),
        help("Only memory, modalias, kernel, id, display_length, control and internet relations are checkable")
    )]
    UnsupportedItemKind(String),

    #[error("Unable to check for component `{0}`: no component registry available")]
    #[diagnostic(
        code(metainfo_core::relation::no_registry),
        help("Pass the manifests of installed components with --with")
    )]
    RegistryUnavailable(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Probe(#[from] SystemInfoError),

    #[error("Failed to check `{relation}`")]
    #[diagnostic(code(metainfo_core::relation::check))]
    Check {
        relation: String,
        #[source]
        source: Box<RelationError>,
    },
}

/// Errors when decoding a relation manifest.
#[derive(Error, Diagnostic, Debug)]
pub enum ManifestError {
    #[error("Failed to parse manifest {}", path.display())]
    #[diagnostic(
        code(metainfo_core::manifest::toml),
        help("Check the manifest's TOML syntax and field names")
    )]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Relation entry #{index} in [[{kind}]] declares {found} item keys, expected exactly one")]
    #[diagnostic(
        code(metainfo_core::manifest::item_count),
        help("Use one of: memory, modalias, kernel, id, firmware, control, display_length, internet")
    )]
    ItemCount {
        kind: &'static str,
        index: usize,
        found: usize,
    },

    #[error("Invalid value in [[{kind}]] entry #{index}: {source}")]
    #[diagnostic(code(metainfo_core::manifest::value))]
    Value {
        kind: &'static str,
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("Relation entry #{index} in [[{kind}]] sets both `compare` and a version operator")]
    #[diagnostic(
        code(metainfo_core::manifest::compare),
        help("Put the operator in front of the version, e.g. version = \">= 6.2\"")
    )]
    ConflictingCompare { kind: &'static str, index: usize },
}

/// Umbrella error used by callers combining config, probes and relations.
#[derive(Error, Diagnostic, Debug)]
pub enum MetainfoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    SystemInfo(#[from] SystemInfoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    #[diagnostic(code(metainfo::parse))]
    Parse(#[from] ParseError),

    #[error("Error while {action}")]
    #[diagnostic(code(metainfo::io), help("Check file permissions"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SystemInfoResult<T> = std::result::Result<T, SystemInfoError>;
pub type RelationResult<T> = std::result::Result<T, RelationError>;
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;
