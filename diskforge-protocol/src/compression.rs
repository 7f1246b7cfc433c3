//! Compression pipeline wrapped around the streaming copy core. Picks a
//! concrete encoder/decoder per `Compression` variant (spec.md §4.5:
//! "Recognized compressions: none, gzip, lz4, zstd").

use std::io::{self, Read, Write};

use diskforge_types::Compression;

const ZSTD_LEVEL: i32 = 3;

/// A writer that can be asked to flush its compression trailer and hand
/// the underlying sink back, consuming itself in the process — `Write`
/// alone can't express "finish", so every variant implements this too.
pub trait FinishableWriter: Write {
    fn finish(self: Box<Self>) -> io::Result<()>;
}

struct IdentityWriter<W: Write>(W);

impl<W: Write> Write for IdentityWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishableWriter for IdentityWriter<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

struct GzWriter<W: Write>(flate2::write::GzEncoder<W>);

impl<W: Write> Write for GzWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishableWriter for GzWriter<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.0.finish().map(|_| ())
    }
}

struct ZstdWriter<W: Write>(zstd::Encoder<'static, W>);

impl<W: Write> Write for ZstdWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishableWriter for ZstdWriter<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.0.finish().map(|_| ())
    }
}

struct Lz4Writer<W: Write>(lz4_flex::frame::FrameEncoder<W>);

impl<W: Write> Write for Lz4Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishableWriter for Lz4Writer<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.0
            .finish()
            .map(|_| ())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

/// Wrap `sink` in the encoder for `compression`. The returned writer
/// must have `finish()` called on it (consuming it) once the last byte
/// has been written, to flush container trailers.
pub fn compressing_writer<W: Write + Send + 'static>(
    sink: W,
    compression: Compression,
) -> io::Result<Box<dyn FinishableWriter + Send>> {
    Ok(match compression {
        Compression::None => Box::new(IdentityWriter(sink)),
        Compression::Gzip => Box::new(GzWriter(flate2::write::GzEncoder::new(
            sink,
            flate2::Compression::default(),
        ))),
        Compression::Zstd => Box::new(ZstdWriter(zstd::Encoder::new(sink, ZSTD_LEVEL)?)),
        Compression::Lz4 => Box::new(Lz4Writer(lz4_flex::frame::FrameEncoder::new(sink))),
    })
}

/// Wrap `source` in the decoder for `compression`.
pub fn decompressing_reader<R: Read + Send + 'static>(
    source: R,
    compression: Compression,
) -> io::Result<Box<dyn Read + Send>> {
    Ok(match compression {
        Compression::None => Box::new(source),
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(source)),
        Compression::Zstd => Box::new(zstd::Decoder::new(source)?),
        Compression::Lz4 => Box::new(lz4_flex::frame::FrameDecoder::new(source)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn round_trip(compression: Compression) {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(100);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");

        {
            let sink = File::create(&path).unwrap();
            let mut writer = compressing_writer(sink, compression).unwrap();
            writer.write_all(&payload).unwrap();
            writer.finish().unwrap();
        }

        let source = File::open(&path).unwrap();
        let mut reader = decompressing_reader(source, compression).unwrap();
        let mut restored = Vec::new();
        reader.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn none_round_trips() {
        round_trip(Compression::None);
    }

    #[test]
    fn gzip_round_trips() {
        round_trip(Compression::Gzip);
    }

    #[test]
    fn zstd_round_trips() {
        round_trip(Compression::Zstd);
    }

    #[test]
    fn lz4_round_trips() {
        round_trip(Compression::Lz4);
    }
}
