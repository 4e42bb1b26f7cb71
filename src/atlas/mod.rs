//! Tileset atlases and the resource that stores them.
//!
//! A [`TilesetResource`] is a JSON document holding every imported atlas by
//! name together with the shared physics layers. Maps are ordered, so
//! saving the same resource twice produces the same bytes.

mod import;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};
use crate::host::ResourceHost;

pub use import::{build_atlas, collision_layers, import_atlas, tileset_columns, AtlasOutcome};

/// A collision outline attached to one atlas tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionPolygon {
    pub physics_layer: u32,
    /// Tile-local points, origin at the tile centre.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub coords: (u32, u32),
    pub duration_ms: u32,
}

/// One cell of an atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasTile {
    pub coords: (u32, u32),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collision: Vec<CollisionPolygon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animation: Vec<AnimationFrame>,
}

/// An imported tileset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atlas {
    pub name: String,
    pub texture: String,
    pub tile_size: (u32, u32),
    pub margin: u32,
    pub spacing: u32,
    pub columns: u32,
    pub rows: u32,
    pub tiles: Vec<AtlasTile>,
}

impl Atlas {
    pub fn tile(&self, coords: (u32, u32)) -> Option<&AtlasTile> {
        self.tiles.iter().find(|t| t.coords == coords)
    }
}

/// Physics layers a resource can hold, one per collision bit.
pub const MAX_PHYSICS_LAYERS: u32 = 32;

/// Collision bits assigned to one physics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicsLayer {
    pub collision_layer: u32,
}

/// Every atlas imported into one resource file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TilesetResource {
    #[serde(default)]
    pub physics_layers: Vec<PhysicsLayer>,
    #[serde(default)]
    pub atlases: BTreeMap<String, Atlas>,
}

impl TilesetResource {
    /// Load the resource at `path`, or an empty one if none exists yet.
    pub fn load(host: &dyn ResourceHost, path: &Path) -> Result<Self> {
        if !host.exists(path) {
            return Ok(Self::default());
        }
        let bytes = host.read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| ImportError::CorruptResource {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn to_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|e| ImportError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn save(&self, host: &dyn ResourceHost, path: &Path) -> Result<()> {
        host.save(path, &self.to_bytes(path)?)
    }

    pub fn atlas(&self, name: &str) -> Option<&Atlas> {
        self.atlases.get(name)
    }

    /// OR collision bits into physics layers, growing the list as needed.
    pub fn merge_physics_layers(&mut self, layers: &BTreeMap<u32, u32>) {
        for (&index, &bits) in layers {
            let index = index as usize;
            if self.physics_layers.len() <= index {
                self.physics_layers.resize(index + 1, PhysicsLayer::default());
            }
            self.physics_layers[index].collision_layer |= bits;
        }
    }

    /// Make sure `count` physics layers exist.
    pub fn ensure_physics_layers(&mut self, count: usize) {
        if self.physics_layers.len() < count {
            self.physics_layers.resize(count, PhysicsLayer::default());
        }
    }
}
