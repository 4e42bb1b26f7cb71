//! Import options.
//!
//! Options arrive either as a typed block (the `options:` section of
//! `tiledport.yaml`) or as the host's generic string map. Unknown keys are
//! ignored in both forms.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};
use crate::host::PrefabCatalog;
use crate::schema::parse_bool;

pub const DEFAULT_ROOM_WIDTH: u32 = 20;
pub const DEFAULT_ROOM_HEIGHT: u32 = 12;
pub const DEFAULT_COLLISION_LAYER: &str = "collision";

/// Key prefix for prefab entries in a string option map.
const PREFAB_PREFIX: &str = "prefab.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Directory for per-room scenes written by world imports.
    pub target_directory: Option<PathBuf>,
    /// Overrides the source file stem when naming outputs.
    pub target_filename: Option<String>,
    pub verbose: bool,
    pub overrides_existing_atlas: bool,
    /// Defaults to the first map's tile width.
    pub tile_size_in_pixels: Option<u32>,
    pub room_width_in_tiles: u32,
    pub room_height_in_tiles: u32,
    /// Directory for minimap files; defaults to the scene's directory.
    pub map_data_output: Option<PathBuf>,
    /// Tileset resource updated by map and tileset imports.
    pub tileset_resource: Option<PathBuf>,
    /// Object type to external scene path.
    pub prefabs: BTreeMap<String, String>,
    /// Tile layer sampled for minimap occupancy.
    pub collision_layer: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            target_directory: None,
            target_filename: None,
            verbose: false,
            overrides_existing_atlas: false,
            tile_size_in_pixels: None,
            room_width_in_tiles: DEFAULT_ROOM_WIDTH,
            room_height_in_tiles: DEFAULT_ROOM_HEIGHT,
            map_data_output: None,
            tileset_resource: None,
            prefabs: BTreeMap::new(),
            collision_layer: DEFAULT_COLLISION_LAYER.to_string(),
        }
    }
}

impl ImportOptions {
    /// Build options from string pairs.
    ///
    /// Prefabs are given as `prefab.<Type> = <scene path>`.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key, value)?;
        }
        Ok(options)
    }

    /// Apply a single string option. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "target_directory" => self.target_directory = non_empty(value).map(PathBuf::from),
            "target_filename" => self.target_filename = non_empty(value).map(str::to_string),
            "verbose" => self.verbose = flag(key, value)?,
            "overrides_existing_atlas" => self.overrides_existing_atlas = flag(key, value)?,
            "tile_size_in_pixels" => {
                self.tile_size_in_pixels = match non_empty(value) {
                    Some(v) => Some(number(key, v)?),
                    None => None,
                }
            }
            "room_width_in_tiles" => self.room_width_in_tiles = number(key, value)?,
            "room_height_in_tiles" => self.room_height_in_tiles = number(key, value)?,
            "map_data_output" => self.map_data_output = non_empty(value).map(PathBuf::from),
            "tileset_resource" => self.tileset_resource = non_empty(value).map(PathBuf::from),
            "collision_layer" => self.collision_layer = value.to_string(),
            _ => {
                if let Some(object_type) = key.strip_prefix(PREFAB_PREFIX) {
                    self.prefabs
                        .insert(object_type.to_string(), value.to_string());
                }
            }
        }
        Ok(())
    }

    pub fn prefab_catalog(&self) -> PrefabCatalog {
        PrefabCatalog::new(&self.prefabs)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn flag(name: &str, value: &str) -> Result<bool> {
    parse_bool(value).ok_or_else(|| ImportError::InvalidOption {
        name: name.to_string(),
        message: format!("expected true or false, found '{}'", value),
    })
}

fn number(name: &str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| ImportError::InvalidOption {
        name: name.to_string(),
        message: format!("expected a non-negative integer, found '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::default();
        assert!(!options.verbose);
        assert!(!options.overrides_existing_atlas);
        assert_eq!(options.room_width_in_tiles, 20);
        assert_eq!(options.room_height_in_tiles, 12);
        assert_eq!(options.collision_layer, "collision");
        assert_eq!(options.tile_size_in_pixels, None);
    }

    #[test]
    fn test_from_pairs() {
        let options = ImportOptions::from_pairs([
            ("verbose", "true"),
            ("overrides_existing_atlas", "1"),
            ("tile_size_in_pixels", "16"),
            ("room_width_in_tiles", "24"),
            ("map_data_output", "data/minimap"),
            ("prefab.Chest", "prefabs/chest.scene"),
            ("some_future_option", "whatever"),
        ])
        .unwrap();

        assert!(options.verbose);
        assert!(options.overrides_existing_atlas);
        assert_eq!(options.tile_size_in_pixels, Some(16));
        assert_eq!(options.room_width_in_tiles, 24);
        assert_eq!(options.room_height_in_tiles, 12);
        assert_eq!(options.map_data_output, Some(PathBuf::from("data/minimap")));
        assert_eq!(options.prefab_catalog().lookup("chest"), Some("prefabs/chest.scene"));
    }

    #[test]
    fn test_bad_values_are_invalid_option() {
        match ImportOptions::from_pairs([("room_height_in_tiles", "tall")]) {
            Err(ImportError::InvalidOption { name, .. }) => assert_eq!(name, "room_height_in_tiles"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(ImportOptions::from_pairs([("verbose", "yes please")]).is_err());
    }

    #[test]
    fn test_yaml_block_ignores_unknown_keys() {
        let options: ImportOptions = serde_yaml::from_str(
            "verbose: true\nroom_width_in_tiles: 16\nprefabs:\n  Chest: chest.scene\nunknown: 3\n",
        )
        .unwrap();
        assert!(options.verbose);
        assert_eq!(options.room_width_in_tiles, 16);
        assert_eq!(options.room_height_in_tiles, 12);
        assert_eq!(options.prefabs.get("Chest").map(String::as_str), Some("chest.scene"));
    }
}
