//! Project discovery for `tiledport build`.
//!
//! Finds the editor files in a project, either under the sources named by a
//! `tiledport.yaml` manifest or by scanning the whole directory, and plans
//! one import per file.
//!
//! # Example
//!
//! ```ignore
//! use tiledport::discovery::discover;
//!
//! let project = discover("./game")?;
//! for job in project.jobs() {
//!     println!("{} -> {}", job.source.display(), job.save_path.display());
//! }
//! ```

mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::import::{ImportOptions, SourceKind};

pub use manifest::Manifest;
pub use scanner::{scan_directory, scan_sources, ScanResult};

pub const MANIFEST_FILENAME: &str = "tiledport.yaml";

/// Resource file that collects every atlas when the manifest names none.
pub const DEFAULT_TILESET_RESOURCE: &str = "tilesets.json";

/// Minimap directory, under the output, when the manifest names none.
pub const DEFAULT_MAP_DATA_DIR: &str = "minimap";

/// A discovered project.
#[derive(Debug)]
pub struct DiscoveryResult {
    pub root: PathBuf,
    /// The loaded manifest, or the default when there is none.
    pub manifest: Manifest,
    pub has_manifest: bool,
    pub scan: ScanResult,
}

/// One planned import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJob {
    pub kind: SourceKind,
    pub source: PathBuf,
    pub save_path: PathBuf,
}

impl DiscoveryResult {
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.output)
    }

    /// Manifest options with project paths resolved against the root.
    ///
    /// Every atlas goes into one resource, so maps always find the atlases
    /// their tilesets were imported into. Minimaps get their own directory
    /// so they never collide with world scenes.
    pub fn options(&self) -> ImportOptions {
        let mut options = self.manifest.options.clone();
        let resolve = |path: &Path| self.root.join(path);
        options.tileset_resource = Some(match &options.tileset_resource {
            Some(path) => resolve(path),
            None => self.output_dir().join(DEFAULT_TILESET_RESOURCE),
        });
        options.target_directory = options.target_directory.as_deref().map(resolve);
        options.map_data_output = Some(match &options.map_data_output {
            Some(path) => resolve(path),
            None => self.output_dir().join(DEFAULT_MAP_DATA_DIR),
        });
        options
    }

    /// Imports in dependency order: tilesets, then maps, then worlds.
    pub fn jobs(&self) -> Vec<ImportJob> {
        let output = self.output_dir();
        let resource = self
            .options()
            .tileset_resource
            .unwrap_or_else(|| output.join(DEFAULT_TILESET_RESOURCE));

        let mut jobs = Vec::with_capacity(self.scan.total());
        for kind in [SourceKind::Tileset, SourceKind::Map, SourceKind::World] {
            for source in self.scan.files_of_kind(kind) {
                let save_path = match kind {
                    SourceKind::Tileset => resource.clone(),
                    SourceKind::Map | SourceKind::World => {
                        let relative = source
                            .strip_prefix(&self.root)
                            .ok()
                            .or_else(|| source.file_name().map(Path::new))
                            .unwrap_or(source);
                        output.join(relative).with_extension(&self.manifest.format)
                    }
                };
                jobs.push(ImportJob {
                    kind,
                    source: source.clone(),
                    save_path,
                });
            }
        }
        jobs
    }
}

/// Discover a project rooted at `root`.
///
/// Uses the sources listed in `tiledport.yaml` when the manifest exists,
/// otherwise scans the whole directory.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();

    let manifest_path = root.join(MANIFEST_FILENAME);
    let (manifest, has_manifest) = if manifest_path.exists() {
        (Manifest::load(&manifest_path)?, true)
    } else {
        (Manifest::default(), false)
    };

    let scan = scan_sources(&manifest.effective_sources(), &root, &manifest);

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        scan,
    })
}

/// Discover explicit files and directories, without a manifest.
pub fn discover_paths(paths: &[PathBuf]) -> DiscoveryResult {
    let manifest = Manifest::default();
    let mut scan = ScanResult::new();

    for path in paths {
        if path.is_dir() {
            scan.merge(scan_directory(path, &manifest));
        } else {
            scan.add(path.clone());
        }
    }
    scan.sort();

    let root = paths
        .first()
        .map(|p| if p.is_dir() { p.as_path() } else { p.parent().unwrap_or(Path::new("")) })
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    DiscoveryResult {
        root,
        manifest,
        has_manifest: false,
        scan,
    }
}
