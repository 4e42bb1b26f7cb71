//! World manifests: a JSON list of maps with pixel offsets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// One map placed in a world.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldMap {
    /// Map path, relative to the world file.
    pub file_name: String,
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// A decoded world manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub maps: Vec<WorldMap>,
    #[serde(rename = "type", default)]
    pub world_type: Option<String>,
    #[serde(default)]
    pub only_show_adjacent_maps: bool,
}

impl World {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ImportError::World(e.to_string()))
    }

    /// Resolve each map's path against the directory of the world file.
    pub fn map_paths(&self, world_path: &Path) -> Vec<PathBuf> {
        let base = world_path.parent().unwrap_or_else(|| Path::new(""));
        self.maps.iter().map(|m| base.join(&m.file_name)).collect()
    }
}
