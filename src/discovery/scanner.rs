//! Recursive scan for editor files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::import::SourceKind;

use super::manifest::Manifest;

/// Editor files found under the project's sources, by kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub tilesets: Vec<PathBuf>,
    pub maps: Vec<PathBuf>,
    pub worlds: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.tilesets.len() + self.maps.len() + self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn files_of_kind(&self, kind: SourceKind) -> &[PathBuf] {
        match kind {
            SourceKind::Tileset => &self.tilesets,
            SourceKind::Map => &self.maps,
            SourceKind::World => &self.worlds,
        }
    }

    /// File a path under its kind. Other files are ignored.
    pub fn add(&mut self, path: PathBuf) {
        match SourceKind::from_path(&path) {
            Ok(SourceKind::Tileset) => self.tilesets.push(path),
            Ok(SourceKind::Map) => self.maps.push(path),
            Ok(SourceKind::World) => self.worlds.push(path),
            Err(_) => {}
        }
    }

    pub fn merge(&mut self, other: ScanResult) {
        self.tilesets.extend(other.tilesets);
        self.maps.extend(other.maps);
        self.worlds.extend(other.worlds);
    }

    /// Sort each list so builds run in a stable order.
    pub fn sort(&mut self) {
        self.tilesets.sort();
        self.maps.sort();
        self.worlds.sort();
    }
}

/// Recursively collect `.tsx`, `.tmx` and `.world` files under `root`.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if manifest.is_excluded(relative) {
            continue;
        }
        result.add(path.to_path_buf());
    }

    result.sort();
    result
}

/// Scan every source directory, relative to `base_path`.
pub fn scan_sources(sources: &[String], base_path: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };
        result.merge(scan_directory(&source_path, manifest));
    }

    result.sort();
    result
}
