//! Reader for udev hwdb source files (`*.hwdb`).
//!
//! A record is one or more unindented match lines followed by indented
//! `KEY=VALUE` property lines. Comments start with `#`, records are
//! separated by blank lines.

use std::{fs, path::PathBuf};

use fast_glob::glob_match;
use tracing::debug;

use super::udev::DeviceProperties;
use crate::error::{SystemInfoError, SystemInfoResult};

pub const VENDOR_KEY: &str = "ID_VENDOR_FROM_DATABASE";
pub const MODEL_KEY: &str = "ID_MODEL_FROM_DATABASE";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct HwdbRecord {
    matches: Vec<String>,
    properties: Vec<(String, String)>,
}

#[derive(Debug, Default, Clone)]
pub struct Hwdb {
    records: Vec<HwdbRecord>,
}

impl Hwdb {
    pub fn parse(content: &str) -> Self {
        let mut hwdb = Self::default();
        hwdb.extend_from_str(content);
        hwdb
    }

    fn extend_from_str(&mut self, content: &str) {
        let mut current = HwdbRecord::default();

        for line in content.lines() {
            if line.trim().is_empty() {
                self.push(std::mem::take(&mut current));
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((key, value)) = line.trim().split_once('=') {
                    current.properties.push((key.to_string(), value.to_string()));
                }
            } else {
                // A match line after properties opens a new record.
                if !current.properties.is_empty() {
                    self.push(std::mem::take(&mut current));
                }
                current.matches.push(line.trim_end().to_string());
            }
        }
        self.push(current);
    }

    fn push(&mut self, record: HwdbRecord) {
        if !record.matches.is_empty() && !record.properties.is_empty() {
            self.records.push(record);
        }
    }

    /// Loads every `*.hwdb` file from `dirs`. Files are read in name order,
    /// directory by directory, so later directories override earlier ones.
    ///
    /// Fails when none of the directories exist.
    pub fn load(dirs: &[PathBuf]) -> SystemInfoResult<Self> {
        let mut hwdb = Self::default();
        let mut any_dir = false;

        for dir in dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(SystemInfoError::Hwdb(format!("{}: {err}", dir.display()))),
            };
            any_dir = true;

            let mut files: Vec<PathBuf> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "hwdb"))
                .collect();
            files.sort();

            for file in files {
                let content = fs::read_to_string(&file)
                    .map_err(|err| SystemInfoError::Hwdb(format!("{}: {err}", file.display())))?;
                hwdb.extend_from_str(&content);
            }
        }

        if !any_dir {
            let searched = dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SystemInfoError::Hwdb(format!("no hwdb sources in {searched}")));
        }

        debug!("loaded {} hwdb records", hwdb.records.len());
        Ok(hwdb)
    }

    /// Properties of every record whose match glob accepts `modalias`.
    /// Later records override earlier ones.
    pub fn lookup(&self, modalias: &str) -> DeviceProperties {
        let mut props = DeviceProperties::new();
        for record in &self.records {
            if record.matches.iter().any(|m| m == modalias || glob_match(m, modalias)) {
                for (key, value) in &record.properties {
                    props.insert(key.clone(), value.clone());
                }
            }
        }
        props
    }

    pub fn get(&self, modalias: &str, key: &str) -> Option<String> {
        self.lookup(modalias).remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
