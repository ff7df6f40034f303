//! Shared types for zenview.
//!
//! This crate holds everything that describes assets in the *source* space,
//! before any conversion happens:
//!
//! - [`math`] - POD math types as stored by the source engine (row-major, left-handed)
//! - [`records`] - Typed asset records (meshes, hierarchies, animations, worlds, textures)
//! - [`archive`] - The mountable record archive container
//! - [`archive_format`] - Archive format constants (extension, magic, version)

pub mod archive;
pub mod archive_format;
pub mod math;
pub mod records;

pub use archive::{ArchiveEntry, RecordArchive};
pub use archive_format::{ARCHIVE_FORMAT, ArchiveFormat};
pub use math::SourceMatrix;
pub use records::*;
