//! tiledport - tile-map editor importer
//!
//! Reads tile maps (`.tmx`), tilesets (`.tsx`) and world manifests
//! (`.world`) and turns them into engine-agnostic scene descriptions, tileset
//! atlas resources and room-adjacency minimaps.

pub mod atlas;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod host;
pub mod import;
pub mod minimap;
pub mod output;
pub mod parser;
pub mod scene;
pub mod schema;
pub mod session;
pub mod types;
pub mod validation;

pub use atlas::{Atlas, AtlasOutcome, TilesetResource};
pub use discovery::{discover, discover_paths, DiscoveryResult, ImportJob, Manifest, ScanResult};
pub use error::{ImportError, Result};
pub use host::{FileHost, MemoryHost, PrefabCatalog, ResourceHost};
pub use import::{import_resource, ImportContext, ImportOptions, ImportReport, ImportStatus, SourceKind};
pub use minimap::{Border, Minimap, MinimapRecord, OccupancyGrid, RoomGrid};
pub use parser::{parse_markup, Element};
pub use scene::{assemble, SceneDescription, WorldScene};
pub use schema::{decode_str, FromElement, TileMap, TileSet, World};
pub use session::{ImportSession, ResolvedTile};
pub use types::{Colour, Gid};
pub use validation::{validate_map, validate_tileset, Diagnostic, Severity, ValidationResult};
