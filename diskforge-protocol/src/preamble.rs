//! The common preamble every destructive op runs through before it
//! touches a single byte (spec.md §4.5: "Common preamble").

use diskforge_backend::PlatformBackend;

use crate::error::{ProtocolError, Result};

pub fn ensure_not_system_disk(backend: &dyn PlatformBackend, path: &str) -> Result<()> {
    if backend.is_system_device(path)? {
        return Err(ProtocolError::Precondition(format!(
            "cannot write to system disk: {path}"
        )));
    }
    Ok(())
}

pub fn ensure_not_mounted(backend: &dyn PlatformBackend, path: &str) -> Result<()> {
    if backend.is_device_mounted(path)? {
        return Err(ProtocolError::Precondition(format!(
            "target is mounted, unmount it first: {path}"
        )));
    }
    Ok(())
}

/// `target ≥ source` is allowed; anything smaller fails naming both
/// sizes in the message (spec.md §8 boundary property, scenario 6).
pub fn check_sizes(source_size: u64, target_size: u64) -> Result<()> {
    if target_size < source_size {
        return Err(ProtocolError::Precondition(format!(
            "target size ({target_size} bytes) is smaller than source size ({source_size} bytes)"
        )));
    }
    Ok(())
}

pub fn resolve_extent_size(backend: &dyn PlatformBackend, path: &str) -> Result<u64> {
    if let Some(disk) = backend.get_disk_info(path)? {
        return Ok(disk.size_bytes);
    }
    if let Some(partition) = backend.get_partition_info(path)? {
        return Ok(partition.size_bytes);
    }
    Err(ProtocolError::Precondition(format!(
        "cannot resolve device: {path}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diskforge_backend::MemoryBackend;

    #[test]
    fn refuses_write_to_system_disk() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/sda", 1024, None);
        backend.mark_system_disk("/dev/sda");
        assert!(ensure_not_system_disk(&backend, "/dev/sda").is_err());
    }

    #[test]
    fn size_check_allows_equal_sizes() {
        assert!(check_sizes(1024, 1024).is_ok());
        assert!(check_sizes(1024, 1023).is_err());
    }
}
