use std::{error::Error, fmt};

/// Error returned when a textual token cannot be decoded into one of the
/// small closed enumerations used across the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty { kind: &'static str },

    UnknownValue { kind: &'static str, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty { kind } => write!(f, "Empty {kind} value"),
            ParseError::UnknownValue { kind, value } => {
                write!(f, "Unknown {kind} `{value}`")
            }
        }
    }
}

impl Error for ParseError {}

#[derive(Debug)]
pub enum PathError {
    Empty,

    NoHomeDir,

    MissingEnvVar { var: String, input: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Empty => write!(f, "Path is empty"),
            PathError::NoHomeDir => write!(f, "Unable to determine the home directory"),
            PathError::MissingEnvVar { var, input } => {
                write!(f, "Environment variable `{var}` not set in `{input}`")
            }
        }
    }
}

impl Error for PathError {}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
pub type PathResult<T> = std::result::Result<T, PathError>;
