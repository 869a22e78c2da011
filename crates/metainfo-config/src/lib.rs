pub mod annotations;
pub mod config;
pub mod error;
pub mod profile;

#[cfg(test)]
pub mod test_utils;
