//! The destructive-operation protocol (spec.md §4.5): the one streaming
//! copy-with-checksum algorithm every clone/image/restore reuses, plus
//! the common preamble (system-disk guard, mount guard, size check,
//! dry-run short-circuit) they all run through first.
//!
//! This crate has no opinion on *whether* an operation is allowed to
//! run — that's `diskforge-safety` — nor on job lifecycle — that's
//! `diskforge-jobs`. It is given a `&dyn PlatformBackend` and a
//! `JobContext` and performs the bytes-on-the-wire work.

pub mod clone;
pub mod compression;
pub mod copy;
pub mod error;
pub mod image;
pub mod preamble;

pub use clone::{clone_disk, clone_partition};
pub use copy::{stream_copy, HashingReader, DEFAULT_BLOCK_SIZE};
pub use error::{ProtocolError, Result};
pub use image::{create_image, load_image_info, restore_image};
