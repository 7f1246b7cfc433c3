//! Image creation and restore: the compression-aware variant of the
//! streaming copy core.

use std::path::Path;

use diskforge_backend::{OperationOutcome, PlatformBackend};
use diskforge_jobs::JobContext;
use diskforge_types::{Compression, ImageInfo, ImageOptions, RestoreOptions};

use crate::compression::{compressing_writer, decompressing_reader};
use crate::copy::{stream_copy, HashingReader, DEFAULT_BLOCK_SIZE};
use crate::error::{ProtocolError, Result};
use crate::preamble::{check_sizes, ensure_not_mounted, ensure_not_system_disk, resolve_extent_size};

/// Create a backup image of `options.source_path`. The written path
/// gains a compression suffix (`.gz`/`.lz4`/`.zst`) and is accompanied by
/// a `<image>.meta.json` sidecar.
pub fn create_image(
    backend: &dyn PlatformBackend,
    context: &JobContext,
    options: &ImageOptions,
) -> Result<ImageInfo> {
    let source_size = resolve_extent_size(backend, &options.source_path)?;
    let image_path = format!("{}{}", options.image_path, options.compression.suffix());

    if options.dry_run {
        let mut info = ImageInfo::new(&image_path, &options.source_path);
        info.source_size_bytes = source_size;
        info.metadata.insert("dry_run".to_string(), serde_json::json!(true));
        return Ok(info);
    }

    context.update_progress(
        None,
        None,
        Some(&format!("imaging {} -> {image_path}", options.source_path)),
        Some("image"),
        Some(0),
        Some(source_size),
        None,
    );

    let block_size = options.block_size_bytes.unwrap_or(DEFAULT_BLOCK_SIZE as u64) as usize;

    {
        let reader = backend.open_reader(&options.source_path)?;
        let mut hashing_reader = HashingReader::new(reader);
        let writer = backend.open_writer(&image_path)?;
        let mut compressor = compressing_writer(writer, options.compression)?;
        stream_copy(context, &mut hashing_reader, &mut compressor, block_size, source_size)?;
        compressor.finish()?;

        let image_size_bytes = backend.open_reader(&image_path)?.len_bytes();
        let checksum = hashing_reader.hex_digest();

        let mut info = ImageInfo::new(&image_path, &options.source_path);
        info.source_size_bytes = source_size;
        info.image_size_bytes = image_size_bytes;
        info.compression = match options.compression {
            Compression::None => None,
            other => Some(other),
        };
        info.checksum = Some(checksum);

        write_sidecar(backend, &image_path, &info)?;
        Ok(info)
    }
}

/// Restore `options.image_path` onto `options.target_path`, verifying
/// the plaintext checksum against the sidecar when `options.verify`.
pub fn restore_image(
    backend: &dyn PlatformBackend,
    context: &JobContext,
    options: &RestoreOptions,
) -> Result<OperationOutcome> {
    let info = load_image_info(backend, &options.image_path)?;

    ensure_not_system_disk(backend, &options.target_path)?;
    ensure_not_mounted(backend, &options.target_path)?;

    let target_size = resolve_extent_size(backend, &options.target_path)?;
    check_sizes(info.source_size_bytes, target_size)?;

    if options.dry_run {
        return Ok(OperationOutcome::ok(format!(
            "would restore {} ({} bytes) to {}",
            options.image_path, info.source_size_bytes, options.target_path
        )));
    }

    context.update_progress(
        None,
        None,
        Some(&format!("restoring {} -> {}", options.image_path, options.target_path)),
        Some("restore"),
        Some(0),
        Some(info.source_size_bytes),
        None,
    );

    let block_size = options.block_size_bytes.unwrap_or(DEFAULT_BLOCK_SIZE as u64) as usize;
    let compression = info.compression.unwrap_or_else(|| Compression::infer_from_path(Path::new(&info.path)));

    let hex_digest = {
        let reader = backend.open_reader(&info.path)?;
        let decompressed = decompressing_reader(reader, compression)?;
        let mut hashing_reader = HashingReader::new(decompressed);
        let mut target = backend.open_writer(&options.target_path)?;
        stream_copy(context, &mut hashing_reader, &mut target, block_size, info.source_size_bytes)?;
        target.sync()?;
        hashing_reader.hex_digest()
    };

    if options.verify {
        match &info.checksum {
            Some(expected) if expected == &hex_digest => {}
            Some(_) => {
                return Err(ProtocolError::VerificationFailed(
                    "checksum verification failed".to_string(),
                ))
            }
            None => {
                return Err(ProtocolError::VerificationFailed(
                    "no checksum recorded for this image, cannot verify".to_string(),
                ))
            }
        }
    }

    Ok(OperationOutcome::ok(format!(
        "restored {} to {} ({} bytes)",
        options.image_path, options.target_path, info.source_size_bytes
    )))
}

/// Load an image's sidecar metadata, reconstructing a best-effort record
/// when the sidecar is missing rather than failing the restore.
pub fn load_image_info(backend: &dyn PlatformBackend, image_path: &str) -> Result<ImageInfo> {
    let sidecar_path = ImageInfo::sidecar_path(Path::new(image_path));
    let sidecar_path_str = sidecar_path.to_string_lossy().into_owned();

    if let Ok(mut reader) = backend.open_reader(&sidecar_path_str) {
        let mut buf = String::new();
        if std::io::Read::read_to_string(&mut reader, &mut buf).is_ok() {
            if let Ok(info) = serde_json::from_str::<ImageInfo>(&buf) {
                return Ok(info);
            }
        }
    }

    let size = backend.open_reader(image_path)?.len_bytes();
    Ok(ImageInfo::from_path_best_effort(Path::new(image_path), size))
}

fn write_sidecar(backend: &dyn PlatformBackend, image_path: &str, info: &ImageInfo) -> Result<()> {
    let sidecar_path = ImageInfo::sidecar_path(Path::new(image_path));
    let json = serde_json::to_vec_pretty(info).map_err(|e| ProtocolError::Precondition(e.to_string()))?;
    let mut writer = backend.open_writer(&sidecar_path.to_string_lossy())?;
    std::io::Write::write_all(&mut writer, &json)?;
    writer.sync()?;
    Ok(())
}
