//! Record archive format constants.
//!
//! Single source of truth for the archive file extension, magic bytes and
//! version, used by the archive reader/writer and the CLI mount scan.
//!
//! ```
//! use zenview_shared::ARCHIVE_FORMAT;
//!
//! assert_eq!(ARCHIVE_FORMAT.extension, "zvpak");
//! assert_eq!(ARCHIVE_FORMAT.magic, b"ZVPK");
//! ```

/// Archive format constants.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveFormat {
    /// Archive file extension without dot
    pub extension: &'static str,

    /// Magic bytes at start of the archive file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Highest format version this build can read
    pub version: u32,
}

impl ArchiveFormat {
    /// Create a new archive format description.
    pub const fn new(extension: &'static str, magic: &'static [u8; 4], version: u32) -> Self {
        Self {
            extension,
            magic,
            version,
        }
    }

    /// Check whether a byte buffer starts with this format's magic
    pub fn matches(&self, bytes: &[u8]) -> bool {
        bytes.len() >= 4 && &bytes[0..4] == self.magic
    }
}

/// The record archive format.
pub const ARCHIVE_FORMAT: ArchiveFormat = ArchiveFormat::new("zvpak", b"ZVPK", 1);
