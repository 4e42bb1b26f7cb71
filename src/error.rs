use miette::Diagnostic;
use thiserror::Error;

use crate::import::ImportStatus;
use crate::parser::span::Location;

/// Main error type for tiledport operations
#[derive(Error, Diagnostic, Debug)]
pub enum ImportError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(tiledport::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Malformed markup at {location}: {message}")]
    #[diagnostic(code(tiledport::parse::xml))]
    Xml { message: String, location: Location },

    #[error("Mismatched closing tag at {location}: expected </{expected}>, found </{found}>")]
    #[diagnostic(
        code(tiledport::parse::mismatched_tag),
        help("Every element must be closed in the reverse order it was opened")
    )]
    MismatchedTag {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("Document has no data: {message}")]
    #[diagnostic(code(tiledport::parse::no_data))]
    NoData { message: String },

    #[error("Expected <{expected}> element, found <{found}>")]
    #[diagnostic(code(tiledport::decode::unexpected_element))]
    UnexpectedElement { expected: String, found: String },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    #[diagnostic(code(tiledport::decode::missing_attribute))]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}> attribute '{attribute}' has invalid value '{value}' (expected {expected})")]
    #[diagnostic(code(tiledport::decode::invalid_attribute))]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        expected: &'static str,
    },

    #[error("Unsupported map orientation '{0}'")]
    #[diagnostic(
        code(tiledport::unsupported_orientation),
        help("Only orthogonal maps can be imported")
    )]
    UnsupportedOrientation(String),

    #[error("Infinite maps are not supported")]
    #[diagnostic(
        code(tiledport::infinite_map),
        help("Disable 'Infinite' in the map properties and save the map again")
    )]
    InfiniteMap,

    #[error("Format not supported: {0}")]
    #[diagnostic(code(tiledport::format_not_supported))]
    FormatNotSupported(String),

    #[error("Tileset not found: {name}{}", layer_suffix(.layer))]
    #[diagnostic(code(tiledport::tileset_not_found))]
    TilesetNotFound { name: String, layer: Option<String> },

    #[error("No tileset owns tile GID {gid}{}", layer_suffix(.layer))]
    #[diagnostic(
        code(tiledport::no_tile_for_gid),
        help("Check that every tileset used by the map is still listed in it")
    )]
    NoTileForGid { gid: u32, layer: Option<String> },

    #[error("Tileset '{0}' has no image source")]
    #[diagnostic(
        code(tiledport::no_tileset_image_source),
        help("Only single-image tilesets can be imported as atlases")
    )]
    NoTileSetImageSource(String),

    #[error("Tile size is undefined")]
    #[diagnostic(
        code(tiledport::undefined_tile_size),
        help("Set tile_size_in_pixels or give the map a non-zero tilewidth")
    )]
    UndefinedTileSize,

    #[error("Malformed path: {0}")]
    #[diagnostic(code(tiledport::bad_path))]
    BadPath(String),

    #[error("Failed to save {path}: {message}")]
    #[diagnostic(code(tiledport::save_failed))]
    SaveFailed {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Corrupt resource {path}: {message}")]
    #[diagnostic(
        code(tiledport::corrupt_resource),
        help("Delete the resource to have it rebuilt from scratch")
    )]
    CorruptResource {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Invalid world manifest: {0}")]
    #[diagnostic(code(tiledport::world))]
    World(String),

    #[error("Invalid manifest {path}: {message}")]
    #[diagnostic(
        code(tiledport::manifest),
        help("Check tiledport.yaml syntax")
    )]
    Manifest {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Invalid option '{name}': {message}")]
    #[diagnostic(code(tiledport::invalid_option))]
    InvalidOption { name: String, message: String },

    #[error("Layer '{layer}': {message}")]
    #[diagnostic(code(tiledport::layer_data))]
    LayerData { layer: String, message: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(tiledport::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl ImportError {
    /// Status code reported to the host for this failure.
    pub fn status(&self) -> ImportStatus {
        match self {
            ImportError::Io { .. } => ImportStatus::FileCantRead,
            ImportError::Xml { .. }
            | ImportError::MismatchedTag { .. }
            | ImportError::NoData { .. }
            | ImportError::CorruptResource { .. } => ImportStatus::FileCorrupt,
            ImportError::UnexpectedElement { .. }
            | ImportError::MissingAttribute { .. }
            | ImportError::InvalidAttribute { .. }
            | ImportError::World(_)
            | ImportError::LayerData { .. }
            | ImportError::NoTileForGid { .. }
            | ImportError::Validation { .. } => ImportStatus::InvalidData,
            ImportError::UnsupportedOrientation(_)
            | ImportError::InfiniteMap
            | ImportError::FormatNotSupported(_) => ImportStatus::Unsupported,
            ImportError::TilesetNotFound { .. } | ImportError::NoTileSetImageSource(_) => {
                ImportStatus::FileNotFound
            }
            ImportError::UndefinedTileSize
            | ImportError::InvalidOption { .. }
            | ImportError::Manifest { .. } => ImportStatus::InvalidParameter,
            ImportError::BadPath(_) => ImportStatus::FileBadPath,
            ImportError::SaveFailed { .. } => ImportStatus::CantCreate,
        }
    }

    /// Name the layer a tile lookup failed in. Other errors pass through.
    pub fn in_layer(self, name: &str) -> Self {
        match self {
            ImportError::NoTileForGid { gid, layer: None } => ImportError::NoTileForGid {
                gid,
                layer: Some(name.to_string()),
            },
            ImportError::TilesetNotFound { name: tileset, layer: None } => {
                ImportError::TilesetNotFound {
                    name: tileset,
                    layer: Some(name.to_string()),
                }
            }
            other => other,
        }
    }
}

fn layer_suffix(layer: &Option<String>) -> String {
    layer
        .as_deref()
        .map(|name| format!(" (layer '{}')", name))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ImportError>;
