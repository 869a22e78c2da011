use sysinfo::{MemoryRefreshKind, System};

use crate::error::{SystemInfoError, SystemInfoResult};

const MIB: u64 = 1024 * 1024;

/// Total physical memory in MiB.
pub fn total_memory_mib() -> SystemInfoResult<u64> {
    if !sysinfo::IS_SUPPORTED_SYSTEM {
        return Err(SystemInfoError::Unsupported("Querying total memory"));
    }

    let mut sys = System::new();
    sys.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
    match sys.total_memory() {
        0 => Err(SystemInfoError::Memory),
        bytes => Ok(bytes / MIB),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_memory_is_plausible() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }
        let mib = total_memory_mib().unwrap();
        assert!(mib > 16);
    }
}
