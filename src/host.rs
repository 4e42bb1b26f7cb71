//! The engine-side services the importer relies on.
//!
//! Importers never touch the filesystem directly: they read and save through
//! a [`ResourceHost`]. [`FileHost`] is the real implementation used by the
//! CLI; [`MemoryHost`] keeps everything in memory.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ImportError, Result};

/// Load and save primitives provided by the host engine.
pub trait ResourceHost {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    fn exists(&self, path: &Path) -> bool;

    fn save(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| ImportError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Reads and writes real files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileHost;

impl ResourceHost for FileHost {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| ImportError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn save(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let failed = |e: std::io::Error| ImportError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(failed)?;
        }
        fs::write(path, bytes).map_err(failed)
    }
}

/// An in-memory resource store.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style file insert.
    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.borrow_mut().insert(path.into(), bytes.into());
        self
    }

    /// Contents of a stored file.
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl ResourceHost for MemoryHost {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.get(path).ok_or_else(|| ImportError::Io {
            path: path.to_path_buf(),
            message: "not found".to_string(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn save(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

/// Object types that the host instantiates from an external scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefabCatalog {
    /// Lowercased type name to scene path.
    scenes: BTreeMap<String, String>,
}

impl PrefabCatalog {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        Self {
            scenes: entries
                .into_iter()
                .map(|(name, scene)| (name.to_lowercase(), scene.clone()))
                .collect(),
        }
    }

    /// Scene path for an object type, matched case-insensitively.
    pub fn lookup(&self, object_type: &str) -> Option<&str> {
        if object_type.is_empty() {
            return None;
        }
        self.scenes
            .get(&object_type.to_lowercase())
            .map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_host_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/scenes/room.json");

        FileHost.save(&path, b"{}").unwrap();

        assert!(FileHost.exists(&path));
        assert_eq!(FileHost.read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_file_host_save_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = FileHost.save(&blocker.join("child.json"), b"{}").unwrap_err();
        assert!(matches!(err, ImportError::SaveFailed { .. }));
    }

    #[test]
    fn test_file_host_missing_read() {
        let dir = TempDir::new().unwrap();
        assert!(!FileHost.exists(&dir.path().join("nope.tmx")));
        assert!(matches!(
            FileHost.read(&dir.path().join("nope.tmx")),
            Err(ImportError::Io { .. })
        ));
    }

    #[test]
    fn test_memory_host_round_trip() {
        let host = MemoryHost::new().with_file("maps/a.tmx", "<map/>");
        assert!(host.exists(Path::new("maps/a.tmx")));
        assert_eq!(host.read_to_string(Path::new("maps/a.tmx")).unwrap(), "<map/>");

        host.save(Path::new("out/a.json"), b"[]").unwrap();
        assert_eq!(
            host.paths(),
            vec![PathBuf::from("maps/a.tmx"), PathBuf::from("out/a.json")]
        );
    }

    #[test]
    fn test_prefab_lookup_ignores_case() {
        let entries = BTreeMap::from([("Chest".to_string(), "res://chest.scene".to_string())]);
        let catalog = PrefabCatalog::new(&entries);
        assert_eq!(catalog.lookup("chest"), Some("res://chest.scene"));
        assert_eq!(catalog.lookup("CHEST"), Some("res://chest.scene"));
        assert_eq!(catalog.lookup("door"), None);
        assert_eq!(catalog.lookup(""), None);
    }
}
