use std::io::{Read, Seek, Write};

/// Raw byte-level access to a block device or image file, as handed out by
/// a backend for the streaming protocol in `diskforge-protocol` to read
/// from or write to. Concrete backends open this over `/dev/sdX`-style
/// paths (or platform equivalents); `MemoryBackend` opens it over an
/// in-memory buffer for tests.
pub trait RawDevice: Read + Write + Seek + Send {
    /// Total addressable size in bytes.
    fn len_bytes(&self) -> u64;

    /// Flush buffered writes and sync to stable storage.
    fn sync(&mut self) -> std::io::Result<()>;
}

pub type BoxedRawDevice = Box<dyn RawDevice>;
