use std::{env, path::PathBuf};

use nix::unistd::{getuid, User};

use crate::error::{PathError, PathResult};

/// Returns the current user's home directory.
///
/// `$HOME` wins; otherwise the password database entry of the current uid
/// is consulted.
pub fn home_dir() -> PathResult<PathBuf> {
    if let Some(home) = env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    match User::from_uid(getuid()) {
        Ok(Some(user)) => Ok(user.dir),
        _ => Err(PathError::NoHomeDir),
    }
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn xdg_config_home() -> PathResult<PathBuf> {
    match env::var_os("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(home_dir()?.join(".config")),
    }
}

/// Expands a leading `~` and `$VAR` / `${VAR}` references in `path`.
///
/// Relative results are returned as-is; probe roots are allowed to be
/// relative to the working directory.
pub fn expand_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    if let Some(tail) = rest.strip_prefix('~') {
        if tail.is_empty() || tail.starts_with('/') {
            out.push_str(&home_dir()?.to_string_lossy());
            rest = tail;
        }
    }

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => {
                    return Err(PathError::MissingEnvVar {
                        var: braced.to_string(),
                        input: path.to_string(),
                    })
                }
            }
        } else {
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..len], len)
        };

        if name.is_empty() {
            out.push('$');
        } else {
            let value = env::var(name).map_err(|_| {
                PathError::MissingEnvVar {
                    var: name.to_string(),
                    input: path.to_string(),
                }
            })?;
            out.push_str(&value);
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);

    Ok(PathBuf::from(out))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_expand_home_and_vars() {
        env::set_var("HOME", "/home/tester");
        env::set_var("METAINFO_TEST_DIR", "fixtures");

        assert_eq!(
            expand_path("~/data").unwrap(),
            PathBuf::from("/home/tester/data")
        );
        assert_eq!(
            expand_path("$HOME/${METAINFO_TEST_DIR}/os-release").unwrap(),
            PathBuf::from("/home/tester/fixtures/os-release")
        );
        assert_eq!(expand_path("/a/$/b").unwrap(), PathBuf::from("/a/$/b"));
        assert_eq!(expand_path("~user/x").unwrap(), PathBuf::from("~user/x"));

        env::remove_var("METAINFO_TEST_DIR");
    }

    #[test]
    #[serial]
    fn test_expand_missing_var() {
        env::remove_var("METAINFO_SURELY_UNSET");
        assert!(matches!(
            expand_path("/x/$METAINFO_SURELY_UNSET"),
            Err(PathError::MissingEnvVar { .. })
        ));
        assert!(matches!(
            expand_path("/x/${UNCLOSED"),
            Err(PathError::MissingEnvVar { .. })
        ));
        assert!(matches!(expand_path("  "), Err(PathError::Empty)));
    }

    #[test]
    #[serial]
    fn test_xdg_config_home() {
        env::set_var("HOME", "/home/tester");
        env::set_var("XDG_CONFIG_HOME", "/tmp/cfg");
        assert_eq!(xdg_config_home().unwrap(), PathBuf::from("/tmp/cfg"));

        env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            xdg_config_home().unwrap(),
            PathBuf::from("/home/tester/.config")
        );
    }
}
