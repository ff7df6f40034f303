//! Record archive container (`.zvpak`)
//!
//! An archive is a flat list of named records. Archives are mounted into the
//! asset store in order; later mounts shadow earlier ones for the same name.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Magic: "ZVPK" (4 bytes)                 │
//! ├──────────────────────────────────────────┤
//! │  RecordArchive (bitcode serialized)      │
//! │  ├── version: u32                        │
//! │  └── entries: Vec<ArchiveEntry>          │
//! │       ├── name: String                   │
//! │       └── record: AssetRecord            │
//! └──────────────────────────────────────────┘
//! ```

use std::path::Path;

use anyhow::Context;
use bitcode::{Decode, Encode};

use crate::archive_format::ARCHIVE_FORMAT;
use crate::records::AssetRecord;

/// One named record inside an archive
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ArchiveEntry {
    /// Record name as stored (e.g. `HUMANS.MDS`), case preserved
    pub name: String,
    /// The record payload
    pub record: AssetRecord,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, record: AssetRecord) -> Self {
        Self {
            name: name.into(),
            record,
        }
    }
}

/// A complete record archive
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct RecordArchive {
    /// Archive format version
    pub version: u32,
    /// Entries in archive order
    pub entries: Vec<ArchiveEntry>,
}

impl Default for RecordArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordArchive {
    /// Empty archive at the current format version
    pub fn new() -> Self {
        Self {
            version: ARCHIVE_FORMAT.version,
            entries: Vec::new(),
        }
    }

    /// Append an entry (builder style)
    pub fn with(mut self, name: impl Into<String>, record: AssetRecord) -> Self {
        self.push(name, record);
        self
    }

    /// Append an entry
    pub fn push(&mut self, name: impl Into<String>, record: AssetRecord) {
        self.entries.push(ArchiveEntry::new(name, record));
    }

    /// Serialize archive to bytes with magic header
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = ARCHIVE_FORMAT.magic.to_vec();
        bytes.extend(bitcode::encode(self));
        bytes
    }

    /// Deserialize archive from bytes and validate
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        if !ARCHIVE_FORMAT.matches(bytes) {
            anyhow::bail!(
                "Invalid archive magic bytes (expected: {:?})",
                std::str::from_utf8(ARCHIVE_FORMAT.magic).unwrap_or("ZVPK")
            );
        }

        let archive: RecordArchive = bitcode::decode(&bytes[4..])
            .map_err(|e| anyhow::anyhow!("Failed to decode record archive: {}", e))?;

        archive.validate()?;

        Ok(archive)
    }

    /// Validate archive structure
    ///
    /// Checks the version is supported and that no entry is unnamed.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version > ARCHIVE_FORMAT.version {
            anyhow::bail!(
                "Unsupported archive version: {} (max supported: {})",
                self.version,
                ARCHIVE_FORMAT.version
            );
        }

        if let Some(index) = self.entries.iter().position(|e| e.name.is_empty()) {
            anyhow::bail!("Archive entry {} has an empty name", index);
        }

        Ok(())
    }

    /// Read and decode an archive file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read archive: {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("Invalid archive: {}", path.display()))
    }

    /// Encode and write an archive file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_bytes())
            .with_context(|| format!("Failed to write archive: {}", path.display()))
    }
}
