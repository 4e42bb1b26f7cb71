//! Engine-facing scene descriptions.
//!
//! A [`SceneDescription`] is what the assembler hands to the host: layers,
//! tile placements, collision bodies, markers and prefab requests. It holds
//! no engine objects; the host builds its own nodes from it.

mod assemble;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{ImportError, Result};
use crate::schema::Properties;
use crate::session::ResolvedTile;
use crate::types::Colour;

pub use assemble::assemble;

/// A fully assembled map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDescription {
    pub name: String,
    /// Map size in tiles.
    pub size: (u32, u32),
    pub tile_size: (u32, u32),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Colour>,
    pub nodes: Vec<SceneNode>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Placement shared by every layer node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerInfo {
    pub name: String,
    pub offset: (f64, f64),
    pub visible: bool,
    /// Tint with opacity folded into alpha.
    pub modulate: [f32; 4],
    pub parallax: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneNode {
    TileLayer(TileLayerNode),
    Group(GroupNode),
    Objects(ObjectLayerNode),
    Image(ImageNode),
}

impl SceneNode {
    pub fn info(&self) -> &LayerInfo {
        match self {
            SceneNode::TileLayer(n) => &n.info,
            SceneNode::Group(n) => &n.info,
            SceneNode::Objects(n) => &n.info,
            SceneNode::Image(n) => &n.info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayerNode {
    pub info: LayerInfo,
    pub tiles: Vec<TilePlacement>,
}

/// One non-empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TilePlacement {
    /// Cell column and row in the layer.
    pub cell: (u32, u32),
    pub tile: ResolvedTile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub info: LayerInfo,
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectLayerNode {
    pub info: LayerInfo,
    pub objects: Vec<ObjectNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageNode {
    pub info: LayerInfo,
    pub texture: Option<String>,
    pub repeat: (bool, bool),
}

/// Fields every object node carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInfo {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub position: (f64, f64),
    pub rotation: f64,
    pub visible: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Area,
    StaticBody,
}

impl BodyKind {
    /// Classify a free-form object type, ignoring case.
    pub fn classify(object_type: &str) -> Self {
        let lower = object_type.to_lowercase();
        if ["area", "trigger", "sensor"].iter().any(|k| lower.contains(k)) {
            BodyKind::Area
        } else {
            BodyKind::StaticBody
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CollisionShape {
    Rectangle { width: f64, height: f64 },
    Ellipse { width: f64, height: f64 },
    Polygon { points: Vec<(f64, f64)> },
    Polyline { points: Vec<(f64, f64)> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectNode {
    Tile {
        info: ObjectInfo,
        size: (f64, f64),
        tile: ResolvedTile,
    },
    Body {
        info: ObjectInfo,
        body: BodyKind,
        collision: CollisionShape,
    },
    Marker {
        info: ObjectInfo,
    },
    /// Instantiated by the host from an external scene.
    Prefab {
        info: ObjectInfo,
        scene: String,
    },
    Label {
        info: ObjectInfo,
        text: String,
        wrap: bool,
        size: (f64, f64),
    },
}

impl ObjectNode {
    pub fn info(&self) -> &ObjectInfo {
        match self {
            ObjectNode::Tile { info, .. }
            | ObjectNode::Body { info, .. }
            | ObjectNode::Marker { info }
            | ObjectNode::Prefab { info, .. }
            | ObjectNode::Label { info, .. } => info,
        }
    }
}

/// A room placed in a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomRef {
    pub name: String,
    /// Scene file written for the room, when one was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Pixel offset within the world.
    pub position: (i64, i64),
    /// Pixel size.
    pub size: (u32, u32),
}

/// Top-level scene for a world import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldScene {
    pub name: String,
    pub rooms: Vec<RoomRef>,
}

pub(crate) fn flatten_properties(properties: &Properties) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect()
}

/// Serialise a scene value in the format implied by `path`'s extension.
///
/// `.json` and `.scene` are written as JSON, `.yaml` and `.yml` as YAML.
pub fn encode_for_path<T: Serialize>(value: &T, path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let failed = |message: String| ImportError::SaveFailed {
        path: path.to_path_buf(),
        message,
    };

    match extension.as_str() {
        "json" | "scene" => {
            let mut bytes =
                serde_json::to_vec_pretty(value).map_err(|e| failed(e.to_string()))?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        "yaml" | "yml" => serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| failed(e.to_string())),
        other => Err(ImportError::FormatNotSupported(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{}", other)
        })),
    }
}
