pub mod compare;
pub mod error;
pub mod path;
pub mod rdns;
pub mod vercmp;
