//! Disk- and partition-level cloning: stream the whole source extent to
//! the target, optionally followed by a byte-compare verification pass
//! (spec.md §4.5 — "byte-equality pass ... for disk-to-disk clone").

use std::io::{Read, Seek, SeekFrom};

use diskforge_backend::{OperationOutcome, PlatformBackend};
use diskforge_jobs::JobContext;
use diskforge_types::CloneOptions;

use crate::copy::{stream_copy, DEFAULT_BLOCK_SIZE};
use crate::error::{ProtocolError, Result};
use crate::preamble::{check_sizes, ensure_not_mounted, ensure_not_system_disk, resolve_extent_size};

fn clone_extent(
    backend: &dyn PlatformBackend,
    context: &JobContext,
    options: &CloneOptions,
    guard_system_disk: bool,
) -> Result<OperationOutcome> {
    let source_size = resolve_extent_size(backend, &options.source_path)?;
    let target_size = resolve_extent_size(backend, &options.target_path)?;

    if guard_system_disk {
        ensure_not_system_disk(backend, &options.target_path)?;
    }
    ensure_not_mounted(backend, &options.target_path)?;
    check_sizes(source_size, target_size)?;

    if options.dry_run {
        return Ok(OperationOutcome::ok(format!(
            "would clone {} ({source_size} bytes) to {}",
            options.source_path, options.target_path
        )));
    }

    context.update_progress(
        None,
        None,
        Some(&format!("cloning {} -> {}", options.source_path, options.target_path)),
        Some("clone"),
        Some(0),
        Some(source_size),
        None,
    );

    let block_size = options.block_size_bytes.unwrap_or(DEFAULT_BLOCK_SIZE as u64) as usize;

    {
        let mut reader = backend.open_reader(&options.source_path)?;
        let mut writer = backend.open_writer(&options.target_path)?;
        stream_copy(context, &mut reader, &mut writer, block_size, source_size)?;
        writer.sync()?;
    }

    if options.verify {
        verify_byte_equal(backend, context, &options.source_path, &options.target_path, source_size, block_size)?;
    }

    Ok(OperationOutcome::ok(format!(
        "cloned {} to {} ({source_size} bytes)",
        options.source_path, options.target_path
    )))
}

/// Clone a whole disk. The source disk's own partitions may remain
/// mounted — the protocol reads the raw device underneath them
/// (spec.md §4.5 step 3).
pub fn clone_disk(
    backend: &dyn PlatformBackend,
    context: &JobContext,
    options: &CloneOptions,
) -> Result<OperationOutcome> {
    clone_extent(backend, context, options, true)
}

/// Clone a single partition. Both source and target partitions must be
/// unmounted.
pub fn clone_partition(
    backend: &dyn PlatformBackend,
    context: &JobContext,
    options: &CloneOptions,
) -> Result<OperationOutcome> {
    ensure_not_mounted(backend, &options.source_path)?;
    clone_extent(backend, context, options, false)
}

/// Re-read both extents block by block and compare, failing with the
/// first differing block number (spec.md §4.5).
fn verify_byte_equal(
    backend: &dyn PlatformBackend,
    context: &JobContext,
    source_path: &str,
    target_path: &str,
    total_bytes: u64,
    block_size: usize,
) -> Result<()> {
    context.update_progress(None, None, Some("verifying"), Some("verify"), None, None, None);

    let mut source = backend.open_reader(source_path)?;
    let mut target = backend.open_reader(target_path)?;
    source.seek(SeekFrom::Start(0))?;
    target.seek(SeekFrom::Start(0))?;

    let mut source_buf = vec![0u8; block_size];
    let mut target_buf = vec![0u8; block_size];
    let mut block_number: u64 = 0;
    let mut compared = 0u64;

    while compared < total_bytes {
        context.check_cancelled()?;
        let n = read_exact_or_eof(&mut source, &mut source_buf)?;
        let m = read_exact_or_eof(&mut target, &mut target_buf)?;
        if source_buf[..n] != target_buf[..m] || n != m {
            return Err(ProtocolError::VerificationFailed(format!(
                "block {block_number} differs between source and target"
            )));
        }
        if n == 0 {
            break;
        }
        compared += n as u64;
        block_number += 1;
    }

    Ok(())
}

fn read_exact_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diskforge_backend::MemoryBackend;

    fn opts(source: &str, target: &str, verify: bool) -> CloneOptions {
        CloneOptions {
            source_path: source.into(),
            target_path: target.into(),
            verify,
            block_size_bytes: Some(512),
            dry_run: false,
        }
    }

    #[test]
    fn clone_with_verify_succeeds_on_equal_sized_devices() {
        let backend = MemoryBackend::new();
        let data: Vec<u8> = (0..(4 * 1024 * 1024)).map(|i| (i % 251) as u8).collect();
        backend.add_disk("/dev/src", data.len() as u64, Some(&data));
        backend.add_disk("/dev/tgt", data.len() as u64, None);

        let context = JobContext::new();
        let outcome = clone_disk(&backend, &context, &opts("/dev/src", "/dev/tgt", true)).unwrap();

        assert!(outcome.success);
        assert_eq!(backend.device_bytes("/dev/tgt").unwrap(), data);
        assert_eq!(context.progress().bytes_processed, data.len() as u64);
        assert_eq!(context.progress().percentage(), 100.0);
    }

    #[test]
    fn clone_fails_when_target_smaller_than_source() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/src", 8 * 1024 * 1024, None);
        backend.add_disk("/dev/tgt", 4 * 1024 * 1024, None);

        let context = JobContext::new();
        let err = clone_disk(&backend, &context, &opts("/dev/src", "/dev/tgt", false)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("8388608"));
        assert!(message.contains("4194304"));
    }

    #[test]
    fn clone_refuses_to_write_a_system_disk() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/src", 1024, None);
        backend.add_disk("/dev/tgt", 1024, None);
        backend.mark_system_disk("/dev/tgt");

        let context = JobContext::new();
        let err = clone_disk(&backend, &context, &opts("/dev/src", "/dev/tgt", false)).unwrap_err();
        assert!(err.to_string().contains("system disk"));
    }

    #[test]
    fn dry_run_does_not_touch_the_target() {
        let backend = MemoryBackend::new();
        backend.add_disk("/dev/src", 16, Some(b"0123456789abcdef"));
        backend.add_disk("/dev/tgt", 16, Some(&[0u8; 16]));

        let context = JobContext::new();
        let mut options = opts("/dev/src", "/dev/tgt", false);
        options.dry_run = true;
        let outcome = clone_disk(&backend, &context, &options).unwrap();

        assert!(outcome.success);
        assert_eq!(backend.device_bytes("/dev/tgt").unwrap(), vec![0u8; 16]);
    }
}
