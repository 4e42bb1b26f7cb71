//! Builds atlases from decoded tilesets.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::host::ResourceHost;
use crate::schema::{MapObject, ObjectShape, Properties, TileSet};

use super::{
    AnimationFrame, Atlas, AtlasTile, CollisionPolygon, TilesetResource, MAX_PHYSICS_LAYERS,
};

const COLLISION_LAYER_PREFIX: &str = "collision_layer_";

/// Result of importing one tileset into a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtlasOutcome {
    /// The atlas was already present and overriding was off.
    Unchanged,
    Imported { columns: u32, rows: u32 },
}

/// Import `tileset` into `resource` under `name`.
///
/// An existing atlas is left alone unless `override_existing` is set, so
/// repeated imports are idempotent. Nothing is saved here.
pub fn import_atlas(
    resource: &mut TilesetResource,
    tileset: &TileSet,
    name: &str,
    base_dir: &Path,
    override_existing: bool,
    host: &dyn ResourceHost,
) -> Result<AtlasOutcome> {
    if resource.atlases.contains_key(name) && !override_existing {
        return Ok(AtlasOutcome::Unchanged);
    }

    let atlas = build_atlas(tileset, name, base_dir, host)?;
    resource.merge_physics_layers(&collision_layers(&tileset.properties)?);

    let used = atlas
        .tiles
        .iter()
        .flat_map(|t| t.collision.iter())
        .map(|p| p.physics_layer as usize + 1)
        .max()
        .unwrap_or(0);
    resource.ensure_physics_layers(used);

    let outcome = AtlasOutcome::Imported {
        columns: atlas.columns,
        rows: atlas.rows,
    };
    resource.atlases.insert(name.to_string(), atlas);
    Ok(outcome)
}

/// Build the atlas for a tileset whose file lives in `base_dir`.
pub fn build_atlas(
    tileset: &TileSet,
    name: &str,
    base_dir: &Path,
    host: &dyn ResourceHost,
) -> Result<Atlas> {
    let image = tileset
        .image
        .as_ref()
        .filter(|i| i.source.is_some())
        .ok_or_else(|| ImportError::NoTileSetImageSource(name.to_string()))?;
    let source = image.source.as_deref().unwrap_or_default();
    let texture = base_dir.join(source);

    if tileset.tile_width == 0 || tileset.tile_height == 0 {
        return Err(ImportError::UndefinedTileSize);
    }

    let columns = tileset_columns(tileset, base_dir, host)?;
    let rows = if columns == 0 {
        0
    } else {
        tileset.tile_count / columns
    };

    let half = (
        f64::from(tileset.tile_width) / 2.0,
        f64::from(tileset.tile_height) / 2.0,
    );
    let coords_of = |id: u32| (id % columns, id / columns);

    let mut tiles = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let id = row * columns + column;
            let mut tile = AtlasTile {
                coords: (column, row),
                tile_type: None,
                collision: Vec::new(),
                animation: Vec::new(),
            };
            if let Some(meta) = tileset.tile(id) {
                tile.tile_type = meta.tile_type.clone();
                if let Some(group) = &meta.object_group {
                    tile.collision = group
                        .objects
                        .iter()
                        .filter_map(|object| collision_polygon(object, half))
                        .collect::<Result<Vec<_>>>()?;
                }
                tile.animation = meta
                    .animation
                    .iter()
                    .map(|frame| AnimationFrame {
                        coords: coords_of(frame.tile_id),
                        duration_ms: frame.duration,
                    })
                    .collect();
            }
            tiles.push(tile);
        }
    }

    Ok(Atlas {
        name: name.to_string(),
        texture: texture.to_string_lossy().replace('\\', "/"),
        tile_size: (tileset.tile_width, tileset.tile_height),
        margin: tileset.margin,
        spacing: tileset.spacing,
        columns,
        rows,
        tiles,
    })
}

/// Column count of a tileset, reading its image size when the file leaves
/// `columns` out. Tilesets without a single image have no columns.
pub fn tileset_columns(
    tileset: &TileSet,
    base_dir: &Path,
    host: &dyn ResourceHost,
) -> Result<u32> {
    if tileset.columns > 0 {
        return Ok(tileset.columns);
    }
    let Some(image) = &tileset.image else {
        return Ok(0);
    };
    let width = match (image.width, image.source.as_deref()) {
        (Some(width), _) if width > 0 => width,
        (_, Some(source)) => image_width(host, &base_dir.join(source))?,
        _ => return Ok(0),
    };
    Ok(tileset.columns_for_width(width))
}

/// Outline of one collision object, in tile-local coordinates centred on the
/// tile. Points and text have no outline.
fn collision_polygon(object: &MapObject, half: (f64, f64)) -> Option<Result<CollisionPolygon>> {
    let (x, y, w, h) = (object.x, object.y, object.width, object.height);
    let outline: Vec<(f64, f64)> = match &object.shape {
        ObjectShape::Polygon(points) | ObjectShape::Polyline(points) => {
            points.iter().map(|&(px, py)| (x + px, y + py)).collect()
        }
        ObjectShape::Rectangle | ObjectShape::Ellipse => {
            vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
        }
        ObjectShape::Point | ObjectShape::Text(_) => return None,
    };

    let physics_layer = match object.properties.get_int("physics_layer") {
        None => 0,
        Some(layer) => match u32::try_from(layer) {
            Ok(layer) if layer < MAX_PHYSICS_LAYERS => layer,
            _ => {
                return Some(Err(ImportError::InvalidAttribute {
                    element: "property".to_string(),
                    attribute: "physics_layer".to_string(),
                    value: layer.to_string(),
                    expected: "a physics layer index from 0 to 31",
                }))
            }
        },
    };

    Some(Ok(CollisionPolygon {
        physics_layer,
        points: outline
            .into_iter()
            .map(|(px, py)| (px - half.0, py - half.1))
            .collect(),
    }))
}

/// Collision bitmasks from `collision_layer_<N>` properties.
///
/// Each value lists 1-based collision layer numbers; number `n` sets bit
/// `1 << (n - 1)` on physics layer `N`.
pub fn collision_layers(properties: &Properties) -> Result<BTreeMap<u32, u32>> {
    let mut layers = BTreeMap::new();
    for property in properties.iter() {
        let Some(suffix) = property.name.strip_prefix(COLLISION_LAYER_PREFIX) else {
            continue;
        };
        let invalid = |expected: &'static str| ImportError::InvalidAttribute {
            element: "property".to_string(),
            attribute: property.name.clone(),
            value: property.value.clone(),
            expected,
        };

        let index: u32 = suffix
            .parse()
            .ok()
            .filter(|&n| n < MAX_PHYSICS_LAYERS)
            .ok_or_else(|| invalid("a collision_layer_<N> name with N from 0 to 31"))?;

        let mut bits = 0u32;
        for part in property.value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let n: u32 = part
                .parse()
                .map_err(|_| invalid("comma-separated layer numbers from 1 to 32"))?;
            if !(1..=32).contains(&n) {
                return Err(invalid("comma-separated layer numbers from 1 to 32"));
            }
            bits |= 1 << (n - 1);
        }
        *layers.entry(index).or_insert(0) |= bits;
    }
    Ok(layers)
}

fn image_width(host: &dyn ResourceHost, path: &Path) -> Result<u32> {
    let bytes = host.read(path)?;
    let failed = |message: String| ImportError::Io {
        path: path.to_path_buf(),
        message,
    };
    let (width, _) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| failed(e.to_string()))?
        .into_dimensions()
        .map_err(|e| failed(e.to_string()))?;
    Ok(width)
}
