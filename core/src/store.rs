//! Mounted record store
//!
//! Archives are mounted in order. Every entry whose name has an extension is
//! indexed under its uppercase name; when several archives carry the same
//! name, the most recently mounted one wins and the override is logged.

use std::path::Path;
use std::sync::OnceLock;

use hashbrown::HashMap;
use zenview_shared::records::{
    ModelAnimation, ModelHierarchy, ModelMesh, ModelScript, MultiResMesh, TextureRecord,
    WorldRecord,
};
use zenview_shared::{AssetRecord, RecordArchive};

use crate::error::{AssetError, IntegrityError, Result};

/// A record and the archive it came from
#[derive(Debug, Clone)]
struct StoredRecord {
    source: usize,
    record: AssetRecord,
}

/// Name-indexed view over every mounted archive
#[derive(Debug, Default)]
pub struct AssetStore {
    /// Archive names in mount order
    sources: Vec<String>,

    /// Uppercase name -> winning record
    records: HashMap<String, StoredRecord>,

    // ========================================================================
    // Sorted key cache (rebuilt lazily after each mount)
    // ========================================================================
    sorted_keys: OnceLock<Vec<String>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an in-memory archive, returning how many entries were indexed
    pub fn mount(&mut self, source_name: impl Into<String>, archive: RecordArchive) -> usize {
        let source = self.sources.len();
        self.sources.push(source_name.into());
        self.sorted_keys = OnceLock::new();

        let mut indexed = 0;
        for entry in archive.entries {
            if !entry.name.contains('.') {
                tracing::debug!("Skipping '{}' (no extension)", entry.name);
                continue;
            }

            let stored = StoredRecord {
                source,
                record: entry.record,
            };
            if let Some(previous) = self.records.insert(entry.name.to_uppercase(), stored) {
                tracing::info!(
                    "'{}' from '{}' already in the list (previous archive: '{}')",
                    entry.name,
                    self.sources[source],
                    self.sources[previous.source]
                );
            }
            indexed += 1;
        }

        tracing::info!("Mounted '{}': {} entries", self.sources[source], indexed);
        indexed
    }

    /// Read, decode and mount one archive file
    pub fn mount_path(&mut self, path: &Path) -> Result<usize> {
        let archive = RecordArchive::load(path)?;
        Ok(self.mount(path.display().to_string(), archive))
    }

    /// Mount every archive under `dir` with the given extension
    ///
    /// Files are mounted in sorted path order so overrides are deterministic.
    /// Returns the number of archives mounted.
    pub fn mount_dir(&mut self, dir: &Path, extension: &str) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.map_err(|e| AssetError::Archive(anyhow::Error::new(e)))?;
            let is_archive = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
            if is_archive {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        for path in &paths {
            self.mount_path(path)?;
        }
        Ok(paths.len())
    }

    /// Names of mounted archives, in mount order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(&name.to_uppercase())
    }

    /// Last-mounted record for `name` (case-insensitive)
    pub fn lookup(&self, name: &str) -> Result<&AssetRecord> {
        self.records
            .get(&name.to_uppercase())
            .map(|stored| &stored.record)
            .ok_or_else(|| AssetError::missing(name.to_uppercase()))
    }

    /// Archive that supplied the winning record for `name`
    pub fn source_of(&self, name: &str) -> Option<&str> {
        self.records
            .get(&name.to_uppercase())
            .map(|stored| self.sources[stored.source].as_str())
    }

    /// All indexed names, uppercase and sorted
    pub fn keys(&self) -> &[String] {
        self.sorted_keys.get_or_init(|| {
            let mut keys: Vec<String> = self.records.keys().cloned().collect();
            keys.sort();
            keys
        })
    }

    pub fn texture(&self, name: &str) -> Result<&TextureRecord> {
        match self.lookup(name)? {
            AssetRecord::Texture(r) => Ok(r),
            other => Err(unexpected(name, "texture", other)),
        }
    }

    pub fn multi_res_mesh(&self, name: &str) -> Result<&MultiResMesh> {
        match self.lookup(name)? {
            AssetRecord::MultiResMesh(r) => Ok(r),
            other => Err(unexpected(name, "multi-resolution mesh", other)),
        }
    }

    pub fn model_hierarchy(&self, name: &str) -> Result<&ModelHierarchy> {
        match self.lookup(name)? {
            AssetRecord::ModelHierarchy(r) => Ok(r),
            other => Err(unexpected(name, "model hierarchy", other)),
        }
    }

    pub fn model_mesh(&self, name: &str) -> Result<&ModelMesh> {
        match self.lookup(name)? {
            AssetRecord::ModelMesh(r) => Ok(r),
            other => Err(unexpected(name, "model mesh", other)),
        }
    }

    pub fn model_script(&self, name: &str) -> Result<&ModelScript> {
        match self.lookup(name)? {
            AssetRecord::ModelScript(r) => Ok(r),
            other => Err(unexpected(name, "model script", other)),
        }
    }

    pub fn model_animation(&self, name: &str) -> Result<&ModelAnimation> {
        match self.lookup(name)? {
            AssetRecord::ModelAnimation(r) => Ok(r),
            other => Err(unexpected(name, "model animation", other)),
        }
    }

    pub fn world(&self, name: &str) -> Result<&WorldRecord> {
        match self.lookup(name)? {
            AssetRecord::World(r) => Ok(r),
            other => Err(unexpected(name, "world", other)),
        }
    }
}

fn unexpected(name: &str, expected: &'static str, found: &AssetRecord) -> AssetError {
    AssetError::integrity(
        name.to_uppercase(),
        IntegrityError::UnexpectedRecord {
            expected,
            found: found.kind(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use zenview_shared::ModelScript;

    fn script(skeleton: &str) -> AssetRecord {
        AssetRecord::ModelScript(ModelScript {
            skeleton_name: skeleton.to_string(),
            animations: vec![],
        })
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut store = AssetStore::new();
        store.mount("base", RecordArchive::new().with("Humans.mds", script("HUMANS")));
        assert!(store.lookup("HUMANS.MDS").is_ok());
        assert!(store.lookup("humans.mds").is_ok());
        assert!(store.contains("HuMaNs.MdS"));
    }

    #[test]
    fn test_last_mounted_wins() {
        let mut store = AssetStore::new();
        store.mount("base", RecordArchive::new().with("HUMANS.MDS", script("OLD")));
        store.mount("patch", RecordArchive::new().with("humans.mds", script("NEW")));
        assert_eq!(store.model_script("HUMANS.MDS").unwrap().skeleton_name, "NEW");
        assert_eq!(store.source_of("HUMANS.MDS"), Some("patch"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_repeated_overrides_keep_latest_only() {
        let mut store = AssetStore::new();
        store.mount("base", RecordArchive::new().with("HUMANS.MDS", script("OLD")));
        store.mount(
            "patch",
            RecordArchive::new()
                .with("HUMANS.MDS", script("MID"))
                .with("Humans.mds", script("NEW")),
        );
        store.mount("extra", RecordArchive::new().with("A.MDS", script("A")));

        assert_eq!(store.len(), 2);
        assert_eq!(store.model_script("humans.mds").unwrap().skeleton_name, "NEW");
        assert_eq!(store.source_of("HUMANS.MDS"), Some("patch"));
        assert_eq!(store.source_of("A.MDS"), Some("extra"));
    }

    #[test]
    fn test_names_without_extension_skipped() {
        let mut store = AssetStore::new();
        let indexed = store.mount(
            "base",
            RecordArchive::new()
                .with("README", script("X"))
                .with("A.MDS", script("A")),
        );
        assert_eq!(indexed, 1);
        assert!(matches!(store.lookup("README"), Err(AssetError::Missing { .. })));
    }

    #[test]
    fn test_missing_record() {
        let store = AssetStore::new();
        match store.lookup("nope.zen") {
            Err(AssetError::Missing { name }) => assert_eq!(name, "NOPE.ZEN"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_kind() {
        let mut store = AssetStore::new();
        store.mount("base", RecordArchive::new().with("A.MDS", script("A")));
        let err = store.world("A.MDS").unwrap_err();
        assert!(matches!(
            err,
            AssetError::Integrity {
                error: IntegrityError::UnexpectedRecord { expected: "world", found: "model script" },
                ..
            }
        ));
    }

    #[test]
    fn test_keys_sorted_and_refreshed() {
        let mut store = AssetStore::new();
        store.mount("a", RecordArchive::new().with("b.mds", script("B")).with("a.mds", script("A")));
        assert_eq!(store.keys(), &["A.MDS".to_string(), "B.MDS".to_string()]);
        store.mount("b", RecordArchive::new().with("0.mds", script("0")));
        assert_eq!(store.keys().first().map(String::as_str), Some("0.MDS"));
        assert_eq!(store.keys().len(), 3);
    }

    #[test]
    fn test_mount_dir_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        RecordArchive::new()
            .with("HUMANS.MDS", script("FIRST"))
            .save(&dir.path().join("a.zvpak"))
            .unwrap();
        RecordArchive::new()
            .with("HUMANS.MDS", script("SECOND"))
            .save(&nested.join("b.ZVPAK"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut store = AssetStore::new();
        assert_eq!(store.mount_dir(dir.path(), "zvpak").unwrap(), 2);
        // "a.zvpak" sorts before "nested/b.ZVPAK"
        assert_eq!(store.model_script("humans.mds").unwrap().skeleton_name, "SECOND");
        assert_eq!(store.sources().len(), 2);
    }

    #[test]
    fn test_mount_corrupt_file_is_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.zvpak");
        std::fs::write(&path, b"ZVPK\xff\xff").unwrap();
        let mut store = AssetStore::new();
        assert!(matches!(store.mount_path(&path), Err(AssetError::Archive(_))));
    }
}
