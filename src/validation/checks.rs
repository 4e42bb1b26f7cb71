//! Individual map and tileset checks.
//!
//! Each check returns its own `ValidationResult`; none of them fail.

use crate::schema::{ObjectShape, TileMap, TileSet};
use crate::types::Gid;

use super::diagnostic::{Diagnostic, ValidationResult};

/// Duplicate or out-of-order `firstgid` declarations.
pub fn check_first_gids(map: &TileMap) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (index, pair) in map.tilesets.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.first_gid < previous.first_gid {
            result.push(
                Diagnostic::warning(
                    "tiledport::validate::unsorted-firstgid",
                    format!(
                        "firstgid {} is declared after firstgid {}",
                        current.first_gid, previous.first_gid
                    ),
                )
                .with_subject(current.name())
                .with_help("Tilesets are resolved in firstgid order regardless of declaration order"),
            );
        }
        if map.tilesets[..=index]
            .iter()
            .any(|earlier| earlier.first_gid == current.first_gid)
        {
            result.push(
                Diagnostic::warning(
                    "tiledport::validate::duplicate-firstgid",
                    format!("firstgid {} is declared more than once", current.first_gid),
                )
                .with_subject(current.name())
                .with_help("The last tileset declared with this firstgid is used"),
            );
        }
    }

    result
}

/// Tile layers whose data cannot be decoded.
pub fn check_layer_data(map: &TileMap) -> ValidationResult {
    let mut result = ValidationResult::new();

    for layer in map.all_tile_layers() {
        let problem = match &layer.data {
            None => Some("no data element".to_string()),
            Some(data) => data.decode_csv(layer.width, layer.height).err(),
        };
        if let Some(message) = problem {
            result.push(
                Diagnostic::error("tiledport::validate::layer-data", message)
                    .with_subject(layer.name.clone())
                    .with_help("Save the map with the CSV tile layer format"),
            );
        }
    }

    result
}

/// Tile references that no tileset owns.
///
/// A GID is unowned when it sits below the smallest firstgid, or past the
/// end of an embedded tileset with a known tile count.
pub fn check_tile_references(map: &TileMap) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut ranges: Vec<(u32, Option<u32>)> = map
        .tilesets
        .iter()
        .map(|r| {
            let count = r.inline.as_ref().map(|t| t.tile_count).filter(|&c| c > 0);
            (r.first_gid, count)
        })
        .collect();
    ranges.sort_by_key(|&(first, _)| first);

    let owned = |gid: u32| -> bool {
        let index = ranges.partition_point(|&(first, _)| first <= gid);
        match index.checked_sub(1).map(|i| ranges[i]) {
            None => false,
            Some((first, Some(count))) => gid - first < count,
            Some((_, None)) => true,
        }
    };

    for layer in map.all_tile_layers() {
        let Some(Ok(cells)) = layer
            .data
            .as_ref()
            .map(|d| d.decode_csv(layer.width, layer.height))
        else {
            continue;
        };
        let mut bad: Vec<u32> = cells
            .into_iter()
            .map(|raw| Gid::from_raw(raw).id)
            .filter(|&gid| gid != 0 && !owned(gid))
            .collect();
        bad.sort_unstable();
        bad.dedup();
        if !bad.is_empty() {
            result.push(
                Diagnostic::error(
                    "tiledport::validate::unowned-gid",
                    format!("tile GIDs {:?} belong to no tileset", bad),
                )
                .with_subject(layer.name.clone()),
            );
        }
    }

    for group in map.all_object_groups() {
        for object in &group.objects {
            let Some(raw) = object.gid else { continue };
            let gid = Gid::from_raw(raw).id;
            if gid != 0 && !owned(gid) {
                result.push(
                    Diagnostic::error(
                        "tiledport::validate::unowned-gid",
                        format!("tile object {} uses GID {} which no tileset owns", object.id, gid),
                    )
                    .with_subject(group.name.clone()),
                );
            }
        }
    }

    result
}

/// Map-level settings the assembler cannot handle.
pub fn check_map_settings(map: &TileMap) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Err(e) = map.ensure_supported() {
        result.push(Diagnostic::error("tiledport::validate::unsupported-map", e.to_string()));
    }
    if map.tile_width == 0 || map.tile_height == 0 {
        result.push(
            Diagnostic::error(
                "tiledport::validate::zero-tile-size",
                format!("map tile size is {}x{}", map.tile_width, map.tile_height),
            )
            .with_help("Give the map a non-zero tilewidth and tileheight"),
        );
    }

    result
}

/// Collision objects that produce no outline.
pub fn check_collision_shapes(tileset: &TileSet) -> ValidationResult {
    let mut result = ValidationResult::new();

    for tile in &tileset.tiles {
        let Some(group) = &tile.object_group else { continue };
        for object in &group.objects {
            if matches!(object.shape, ObjectShape::Point | ObjectShape::Text(_)) {
                result.push(
                    Diagnostic::warning(
                        "tiledport::validate::ignored-collision",
                        format!("tile {} has a collision object with no outline", tile.id),
                    )
                    .with_subject(tileset.name.clone()),
                );
            }
        }
    }

    result
}

/// Image and tile size problems that stop an atlas import.
pub fn check_tileset_image(tileset: &TileSet) -> ValidationResult {
    let mut result = ValidationResult::new();

    let has_source = tileset
        .image
        .as_ref()
        .is_some_and(|image| image.source.is_some());
    if !has_source {
        result.push(
            Diagnostic::error(
                "tiledport::validate::missing-image",
                "tileset has no image source",
            )
            .with_subject(tileset.name.clone())
            .with_help("Only single-image tilesets can be imported as atlases"),
        );
    }
    if tileset.tile_width == 0 || tileset.tile_height == 0 {
        result.push(
            Diagnostic::error(
                "tiledport::validate::zero-tile-size",
                format!(
                    "tile size is {}x{}",
                    tileset.tile_width, tileset.tile_height
                ),
            )
            .with_subject(tileset.name.clone()),
        );
    }

    result
}
