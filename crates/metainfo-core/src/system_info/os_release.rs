use std::{fs, path::Path};

use crate::error::{SystemInfoError, SystemInfoResult};

/// The subset of os-release(5) fields used for relation checks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OsRelease {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version_id: Option<String>,
    pub home_url: Option<String>,
}

impl OsRelease {
    /// Parses `KEY=VALUE` lines. Lines without `=` are skipped and later
    /// keys overwrite earlier ones.
    pub fn parse(content: &str) -> Self {
        let mut release = Self::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value);

            let slot = match key.trim() {
                "ID" => &mut release.id,
                "NAME" => &mut release.name,
                "VERSION_ID" => &mut release.version_id,
                "HOME_URL" => &mut release.home_url,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }

        release
    }

    pub fn load(path: &Path) -> SystemInfoResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|err| SystemInfoError::io(format!("reading {}", path.display()), err))?;
        Ok(Self::parse(&content))
    }
}

fn unquote(value: &str) -> &str {
    match value.strip_prefix('"') {
        Some(inner) => inner.strip_suffix('"').unwrap_or(inner),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBIAN_OS_RELEASE: &str = r#"PRETTY_NAME="Debian GNU/Linux 10 (buster)"
NAME="Debian GNU/Linux"
VERSION_ID="10.0"
VERSION="10 (buster)"
VERSION_CODENAME=buster
ID=debian
HOME_URL="https://www.debian.org/"
SUPPORT_URL="https://www.debian.org/support"
BUG_REPORT_URL="https://bugs.debian.org/"
"#;

    #[test]
    fn test_parse_debian() {
        let release = OsRelease::parse(DEBIAN_OS_RELEASE);
        assert_eq!(release.id.as_deref(), Some("debian"));
        assert_eq!(release.name.as_deref(), Some("Debian GNU/Linux"));
        assert_eq!(release.version_id.as_deref(), Some("10.0"));
        assert_eq!(release.home_url.as_deref(), Some("https://www.debian.org/"));
    }

    #[test]
    fn test_parse_skips_junk_and_overwrites() {
        let release = OsRelease::parse("garbage line\nID=first\n\nID=\"second\"\nNAME=\"unterminated\n");
        assert_eq!(release.id.as_deref(), Some("second"));
        assert_eq!(release.name.as_deref(), Some("unterminated"));
        assert_eq!(release.version_id, None);
    }

    #[test]
    fn test_value_with_equals() {
        let release = OsRelease::parse("HOME_URL=\"https://example.org/?a=b\"");
        assert_eq!(release.home_url.as_deref(), Some("https://example.org/?a=b"));
    }
}
