use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walks `root` and maps the contents of every `modalias` file to the
/// directory holding it. Symlinks are not followed.
///
/// Unlistable directories and unreadable `modalias` files are skipped with
/// a warning.
pub fn scan_modaliases(root: &Path) -> BTreeMap<String, PathBuf> {
    let mut found = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error while searching for modalias entries in {}: {err}", root.display());
                continue;
            }
        };
        if entry.file_type().is_symlink() || !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name() != "modalias" {
            continue;
        }

        let path = entry.path();
        let Some(dir) = path.parent() else {
            continue;
        };
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("Unable to read modalias file {}: {err}", path.display());
                continue;
            }
        };
        let modalias = String::from_utf8_lossy(&contents);
        let modalias = modalias.trim();
        if !modalias.is_empty() {
            found.insert(modalias.to_string(), dir.to_path_buf());
        }
    }

    debug!("found {} modaliases below {}", found.len(), root.display());
    found
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_scan_modaliases() {
        let root = tempdir().unwrap();
        let usb = root.path().join("pci0000:00/0000:00:14.0/usb1/1-1");
        let pci = root.path().join("pci0000:00/0000:00:02.0");
        fs::create_dir_all(&usb).unwrap();
        fs::create_dir_all(&pci).unwrap();
        fs::write(usb.join("modalias"), "usb:v1D6Bp0002d0606dc09dsc00dp01\n").unwrap();
        fs::write(pci.join("modalias"), "pci:v00008086d00009A49sv00001028\n").unwrap();
        fs::write(pci.join("uevent"), "DRIVER=i915\n").unwrap();

        let found = scan_modaliases(root.path());
        assert_eq!(found.len(), 2);
        assert_eq!(found["usb:v1D6Bp0002d0606dc09dsc00dp01"], usb);
        assert_eq!(found["pci:v00008086d00009A49sv00001028"], pci);
    }

    #[test]
    fn test_scan_skips_symlinks() {
        let root = tempdir().unwrap();
        let real = root.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("modalias"), "acpi:PNP0C0A:\n").unwrap();
        std::os::unix::fs::symlink(&real, root.path().join("link")).unwrap();

        let found = scan_modaliases(root.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found["acpi:PNP0C0A:"], real);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let root = tempdir().unwrap();
        let found = scan_modaliases(&root.path().join("absent"));
        assert!(found.is_empty());
    }

    #[test]
    fn test_scan_keeps_going_past_odd_files() {
        let root = tempdir().unwrap();
        let mouse = root.path().join("a/mouse");
        let weird = root.path().join("b/weird");
        fs::create_dir_all(&mouse).unwrap();
        fs::create_dir_all(&weird).unwrap();
        fs::write(mouse.join("modalias"), "usb:v046DpC52B\n").unwrap();
        fs::write(weird.join("modalias"), b"platform:\xff\xfe\n").unwrap();

        let found = scan_modaliases(root.path());
        assert_eq!(found.len(), 2);
        assert_eq!(found["usb:v046DpC52B"], mouse);
        assert_eq!(found["platform:\u{FFFD}\u{FFFD}"], weird);
    }
}
