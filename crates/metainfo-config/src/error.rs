use std::path::PathBuf;

use metainfo_utils::error::PathError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(metainfo_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(metainfo_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(metainfo_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Configuration file already exists: {}", .0.display())]
    #[diagnostic(
        code(metainfo_config::already_exists),
        help("Remove the existing config file or set METAINFO_CONFIG to another location")
    )]
    ConfigAlreadyExists(PathBuf),

    #[error("Missing default profile: {0}")]
    #[diagnostic(
        code(metainfo_config::missing_default_profile),
        help("Ensure the default_profile field references an existing [profile.<name>] table")
    )]
    MissingDefaultProfile(String),

    #[error("Missing profile: {0}")]
    #[diagnostic(
        code(metainfo_config::missing_profile),
        help("Add the profile to your configuration or use an existing one")
    )]
    MissingProfile(String),

    #[error("Profile `{profile}` has display_shortest ({shortest}) larger than display_longest ({longest})")]
    #[diagnostic(
        code(metainfo_config::invalid_display),
        help("Swap the values or drop one of them")
    )]
    InvalidDisplay {
        profile: String,
        shortest: u32,
        longest: u32,
    },

    #[error("IO error: {0}")]
    #[diagnostic(code(metainfo_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(metainfo_config::path))]
    Path(#[from] PathError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(metainfo_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
