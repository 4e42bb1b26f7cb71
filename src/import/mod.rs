//! Import entry points for maps, tilesets and worlds.
//!
//! An import reads its source through a [`ResourceHost`], builds every output
//! in memory, and only then saves them. A failure at any step leaves the
//! host untouched.

mod options;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::atlas::{import_atlas, tileset_columns, AtlasOutcome, TilesetResource};
use crate::error::{ImportError, Result};
use crate::host::{FileHost, PrefabCatalog, ResourceHost};
use crate::minimap::{Minimap, OccupancyGrid, RoomGrid, RoomPlacement};
use crate::output::{display_path, plural, Printer};
use crate::scene::{assemble, encode_for_path, RoomRef, WorldScene};
use crate::schema::{decode_str, TileMap, TileSet, World};
use crate::session::ImportSession;
use crate::validation::{Diagnostic, ValidationResult};

pub use options::{
    ImportOptions, DEFAULT_COLLISION_LAYER, DEFAULT_ROOM_HEIGHT, DEFAULT_ROOM_WIDTH,
};

/// Outcome code reported to the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ImportStatus {
    Ok = 0,
    Failed = 1,
    Unsupported = 2,
    FileNotFound = 7,
    FileBadPath = 9,
    FileCantRead = 14,
    FileCorrupt = 16,
    CantCreate = 20,
    InvalidData = 30,
    InvalidParameter = 31,
}

impl ImportStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_ok(self) -> bool {
        self == ImportStatus::Ok
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStatus::Ok => "ok",
            ImportStatus::Failed => "failed",
            ImportStatus::Unsupported => "unsupported",
            ImportStatus::FileNotFound => "file not found",
            ImportStatus::FileBadPath => "bad path",
            ImportStatus::FileCantRead => "can't read file",
            ImportStatus::FileCorrupt => "file corrupt",
            ImportStatus::CantCreate => "can't create",
            ImportStatus::InvalidData => "invalid data",
            ImportStatus::InvalidParameter => "invalid parameter",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// What a source file holds, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Tileset,
    Map,
    World,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("tmx") => Ok(SourceKind::Map),
            Some("tsx") => Ok(SourceKind::Tileset),
            Some("world") => Ok(SourceKind::World),
            Some(other) => Err(ImportError::FormatNotSupported(format!(".{}", other))),
            None => Err(ImportError::FormatNotSupported(path.display().to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Map => "map",
            SourceKind::Tileset => "tileset",
            SourceKind::World => "world",
        }
    }
}

/// Files written by one import, plus anything worth reporting.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub kind: SourceKind,
    pub written: Vec<PathBuf>,
    pub diagnostics: ValidationResult,
}

/// Output built in memory, saved once the whole import has succeeded.
type Artifact = (PathBuf, Vec<u8>);

/// A tileset reachable from the map being imported.
struct LoadedTileset {
    /// Atlas name used by GID resolution.
    name: String,
    tileset: TileSet,
    /// Directory the tileset's image paths are relative to.
    base_dir: PathBuf,
}

struct LoadedMap {
    map: TileMap,
    session: ImportSession,
    tilesets: Vec<LoadedTileset>,
}

/// Everything one import needs from its caller.
pub struct ImportContext<'a> {
    host: &'a dyn ResourceHost,
    options: &'a ImportOptions,
    prefabs: PrefabCatalog,
    printer: Option<&'a Printer>,
}

impl<'a> ImportContext<'a> {
    pub fn new(host: &'a dyn ResourceHost, options: &'a ImportOptions) -> Self {
        Self {
            host,
            options,
            prefabs: options.prefab_catalog(),
            printer: None,
        }
    }

    /// Report progress and warnings through `printer`.
    pub fn with_printer(mut self, printer: &'a Printer) -> Self {
        self.printer = Some(printer);
        self
    }

    /// Import `source`, writing the main output to `save_path`.
    pub fn import(&self, source: &Path, save_path: &Path) -> Result<ImportReport> {
        let kind = SourceKind::from_path(source)?;
        self.log("Importing", &format!("{} {}", kind.label(), display_path(source)));

        let mut report = ImportReport {
            kind,
            written: Vec::new(),
            diagnostics: ValidationResult::new(),
        };
        let artifacts = match kind {
            SourceKind::Map => self.import_map(source, save_path, &mut report)?,
            SourceKind::Tileset => self.import_tileset(source, save_path)?,
            SourceKind::World => self.import_world(source, save_path, &mut report)?,
        };

        for (path, bytes) in artifacts {
            self.host.save(&path, &bytes)?;
            self.log("Writing", &display_path(&path));
            report.written.push(path);
        }
        Ok(report)
    }

    fn import_map(
        &self,
        source: &Path,
        save_path: &Path,
        report: &mut ImportReport,
    ) -> Result<Vec<Artifact>> {
        let name = self.output_name(source)?;
        let loaded = self.load_map(source, report)?;
        let mut artifacts = Vec::new();

        if let Some(resource_path) = &self.options.tileset_resource {
            if let Some(bytes) = self.update_resource(resource_path, &loaded.tilesets)? {
                artifacts.push((resource_path.clone(), bytes));
            }
        }

        let scene = assemble(&loaded.map, &name, &loaded.session, &self.prefabs)?;
        self.log(
            "Assembled",
            &format!("{} ({})", name, plural(scene.nodes.len(), "layer", "layers")),
        );
        artifacts.push((save_path.to_path_buf(), encode_for_path(&scene, save_path)?));
        Ok(artifacts)
    }

    /// Tilesets go into the `tileset_resource` option when set, otherwise
    /// into `save_path`. An atlas that is already present is left alone
    /// unless overriding is on, and then nothing is written.
    fn import_tileset(&self, source: &Path, save_path: &Path) -> Result<Vec<Artifact>> {
        // Maps refer to external tilesets by file stem.
        let name = file_stem(source)?;
        let tileset: TileSet = decode_str(&self.host.read_to_string(source)?)?;
        let loaded = LoadedTileset {
            name,
            tileset,
            base_dir: parent_dir(source),
        };

        let resource_path = self
            .options
            .tileset_resource
            .clone()
            .unwrap_or_else(|| save_path.to_path_buf());
        Ok(self
            .update_resource(&resource_path, [&loaded])?
            .map(|bytes| (resource_path, bytes))
            .into_iter()
            .collect())
    }

    fn import_world(
        &self,
        source: &Path,
        save_path: &Path,
        report: &mut ImportReport,
    ) -> Result<Vec<Artifact>> {
        let name = self.output_name(source)?;
        let world = World::from_json(&self.host.read_to_string(source)?)?;
        let extension = save_path.extension().unwrap_or_default();

        let mut maps = Vec::with_capacity(world.maps.len());
        for path in world.map_paths(source) {
            let loaded = self.load_map(&path, report)?;
            maps.push((file_stem(&path)?, loaded));
        }

        let mut artifacts = Vec::new();
        if let Some(resource_path) = &self.options.tileset_resource {
            let tilesets = maps.iter().flat_map(|(_, loaded)| &loaded.tilesets);
            if let Some(bytes) = self.update_resource(resource_path, tilesets)? {
                artifacts.push((resource_path.clone(), bytes));
            }
        }

        let mut rooms = Vec::with_capacity(maps.len());
        let mut occupancy = Vec::with_capacity(maps.len());
        for ((room_name, loaded), entry) in maps.iter().zip(&world.maps) {
            let scene = assemble(&loaded.map, room_name, &loaded.session, &self.prefabs)?;
            let scene_file = match &self.options.target_directory {
                Some(dir) => {
                    let file = dir.join(Path::new(room_name).with_extension(extension));
                    artifacts.push((file.clone(), encode_for_path(&scene, &file)?));
                    Some(file.display().to_string())
                }
                None => None,
            };
            rooms.push(RoomRef {
                name: room_name.clone(),
                scene: scene_file,
                position: (entry.x, entry.y),
                size: loaded.map.pixel_size()?,
            });

            let layer = loaded.map.properties.get_int("layer").unwrap_or(0);
            let grid = OccupancyGrid::from_map(&loaded.map, &self.options.collision_layer)?;
            occupancy.push(((entry.x, entry.y), layer, grid));
        }

        let tile_size = self
            .options
            .tile_size_in_pixels
            .or_else(|| maps.first().map(|(_, loaded)| loaded.map.tile_width))
            .unwrap_or(0);
        let grid = RoomGrid::new(
            self.options.room_width_in_tiles,
            self.options.room_height_in_tiles,
            tile_size,
        )?;
        let placements: Vec<RoomPlacement<'_>> = occupancy
            .iter()
            .map(|(origin, layer, grid)| RoomPlacement {
                origin: *origin,
                layer: *layer,
                occupancy: grid,
            })
            .collect();
        let minimap = Minimap::build(grid, &placements);
        self.log(
            "Minimap",
            &format!("{} ({})", name, plural(minimap.len(), "cell", "cells")),
        );

        let minimap_dir = match &self.options.map_data_output {
            Some(dir) => dir.clone(),
            None => parent_dir(save_path),
        };
        let minimap_path = minimap_dir.join(format!("{}.json", name));
        if minimap_path == save_path {
            return Err(ImportError::InvalidOption {
                name: "map_data_output".to_string(),
                message: format!(
                    "the minimap would overwrite the world scene at {}",
                    save_path.display()
                ),
            });
        }
        artifacts.push((minimap_path.clone(), minimap.to_json(&minimap_path)?));

        let world_scene = WorldScene { name, rooms };
        artifacts.push((
            save_path.to_path_buf(),
            encode_for_path(&world_scene, save_path)?,
        ));
        Ok(artifacts)
    }

    /// Decode a map and every tileset it uses, ready for assembly.
    fn load_map(&self, path: &Path, report: &mut ImportReport) -> Result<LoadedMap> {
        self.log("Decoding", &display_path(path));
        let map: TileMap = decode_str(&self.host.read_to_string(path)?)?;
        map.ensure_supported()?;

        let mut session = ImportSession::new(&map.tilesets);
        for gid in session.duplicate_first_gids().to_vec() {
            self.warn(
                report,
                Diagnostic::warning(
                    "tiledport::import::duplicate-firstgid",
                    format!("firstgid {} is declared more than once; the last one wins", gid),
                )
                .with_subject(display_path(path)),
            );
        }

        let base_dir = parent_dir(path);
        let mut tilesets = Vec::with_capacity(map.tilesets.len());
        for reference in &map.tilesets {
            let name = reference.name();
            let (tileset, dir) = match (&reference.inline, &reference.source) {
                (Some(inline), _) => (inline.clone(), base_dir.clone()),
                (None, Some(source)) => {
                    let file = base_dir.join(source);
                    if !self.host.exists(&file) {
                        return Err(ImportError::TilesetNotFound { name, layer: None });
                    }
                    self.log("Decoding", &display_path(&file));
                    let tileset: TileSet = decode_str(&self.host.read_to_string(&file)?)?;
                    (tileset, parent_dir(&file))
                }
                (None, None) => return Err(ImportError::TilesetNotFound { name, layer: None }),
            };
            session.register_atlas(name.clone(), tileset_columns(&tileset, &dir, self.host)?);
            tilesets.push(LoadedTileset {
                name,
                tileset,
                base_dir: dir,
            });
        }

        Ok(LoadedMap {
            map,
            session,
            tilesets,
        })
    }

    /// Import atlases into the resource at `path`. Returns the new resource
    /// bytes, or `None` when every atlas was already present.
    fn update_resource<'t>(
        &self,
        path: &Path,
        tilesets: impl IntoIterator<Item = &'t LoadedTileset>,
    ) -> Result<Option<Vec<u8>>> {
        let mut resource = TilesetResource::load(self.host, path)?;
        let mut changed = false;

        for loaded in tilesets {
            let outcome = import_atlas(
                &mut resource,
                &loaded.tileset,
                &loaded.name,
                &loaded.base_dir,
                self.options.overrides_existing_atlas,
                self.host,
            )?;
            match outcome {
                AtlasOutcome::Unchanged => {
                    self.log("Skipping", &format!("atlas {} (already imported)", loaded.name))
                }
                AtlasOutcome::Imported { columns, rows } => {
                    changed = true;
                    self.log(
                        "Atlas",
                        &format!("{} ({}x{} tiles)", loaded.name, columns, rows),
                    );
                }
            }
        }

        if changed {
            Ok(Some(resource.to_bytes(path)?))
        } else {
            Ok(None)
        }
    }

    /// Name for scene and minimap outputs.
    fn output_name(&self, source: &Path) -> Result<String> {
        match &self.options.target_filename {
            Some(name) => Ok(name.clone()),
            None => file_stem(source),
        }
    }

    fn log(&self, verb: &str, message: &str) {
        if !self.options.verbose {
            return;
        }
        if let Some(printer) = self.printer {
            printer.info(verb, message);
        }
    }

    fn warn(&self, report: &mut ImportReport, diagnostic: Diagnostic) {
        if let Some(printer) = self.printer {
            let message = match &diagnostic.subject {
                Some(subject) => format!("{}: {}", subject, diagnostic.message),
                None => diagnostic.message.clone(),
            };
            printer.warning("Warning", &message);
        }
        report.diagnostics.push(diagnostic);
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ImportError::BadPath(path.display().to_string()))
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Import one file from disk and report the outcome as a status code.
pub fn import_resource(source: &Path, save_path: &Path, options: &ImportOptions) -> ImportStatus {
    let printer = Printer::new();
    match ImportContext::new(&FileHost, options)
        .with_printer(&printer)
        .import(source, save_path)
    {
        Ok(_) => ImportStatus::Ok,
        Err(e) => {
            printer.error("Failed", &e.to_string());
            e.status()
        }
    }
}
