//! Room-adjacency minimap derived from collision occupancy.
//!
//! Each map in a world is cut into room-sized modules. Every module edge is
//! classified from the tiles along it (see [`classify_edge`]); fully empty
//! modules are dropped. A second pass opens up the edges shared by two
//! classified modules, so only edges facing the outside keep their walls.
//!
//! The result is written as a flat JSON list of `{x, y, z, borders}` records.

mod border;
mod occupancy;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

pub use border::{
    classify_edge, classify_room, edge_counts, reconcile, Border, Borders, DOWN, LEFT,
    PASSAGE_SLACK, RIGHT, UP,
};
pub use occupancy::OccupancyGrid;

/// Room-grid coordinate: column, row, layer.
pub type CellKey = (i64, i64, i64);

/// Module size and tile size shared by every room in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomGrid {
    pub room_width: u32,
    pub room_height: u32,
    pub tile_size: u32,
}

impl RoomGrid {
    pub fn new(room_width: u32, room_height: u32, tile_size: u32) -> Result<Self> {
        if tile_size == 0 {
            return Err(ImportError::UndefinedTileSize);
        }
        for (name, value) in [
            ("room_width_in_tiles", room_width),
            ("room_height_in_tiles", room_height),
        ] {
            if value == 0 {
                return Err(ImportError::InvalidOption {
                    name: name.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(Self {
            room_width,
            room_height,
            tile_size,
        })
    }

    /// Grid cell containing a pixel position.
    fn cell_of(&self, px: i64, py: i64) -> (i64, i64) {
        let tile = i64::from(self.tile_size);
        (
            px.div_euclid(tile).div_euclid(i64::from(self.room_width)),
            py.div_euclid(tile).div_euclid(i64::from(self.room_height)),
        )
    }
}

/// One map's contribution to the minimap.
#[derive(Debug, Clone, Copy)]
pub struct RoomPlacement<'a> {
    /// Pixel offset in the world.
    pub origin: (i64, i64),
    pub layer: i64,
    pub occupancy: &'a OccupancyGrid,
}

/// A serialised minimap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimapRecord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub borders: Borders,
}

/// Sparse room-grid cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Minimap {
    cells: BTreeMap<CellKey, Borders>,
}

impl Minimap {
    /// Classify every room module of every placement, then reconcile.
    pub fn build(grid: RoomGrid, rooms: &[RoomPlacement<'_>]) -> Self {
        let mut minimap = Self::classify(grid, rooms);
        minimap.reconcile();
        minimap
    }

    /// First pass: per-module classification, no neighbour handling.
    pub fn classify(grid: RoomGrid, rooms: &[RoomPlacement<'_>]) -> Self {
        let mut cells = BTreeMap::new();
        let (rw, rh) = (grid.room_width, grid.room_height);

        for room in rooms {
            let (gx, gy) = grid.cell_of(room.origin.0, room.origin.1);
            let columns = room.occupancy.width().div_ceil(rw);
            let rows = room.occupancy.height().div_ceil(rh);

            for cy in 0..rows {
                for cx in 0..columns {
                    let x0 = i64::from(cx * rw);
                    let y0 = i64::from(cy * rh);
                    let counts = edge_counts(room.occupancy, x0, y0, rw, rh);
                    if let Some(borders) = classify_room(counts, rw, rh) {
                        let key = (gx + i64::from(cx), gy + i64::from(cy), room.layer);
                        cells.insert(key, borders);
                    }
                }
            }
        }

        Self { cells }
    }

    /// Second pass: open up every edge shared by two classified cells.
    ///
    /// Each shared edge is visited once, through the cell on its right or
    /// below, so the result does not depend on iteration order.
    pub fn reconcile(&mut self) {
        let keys: Vec<CellKey> = self.cells.keys().copied().collect();
        for (x, y, z) in keys {
            let shared = [((x - 1, y, z), RIGHT, LEFT), ((x, y - 1, z), DOWN, UP)];
            for (neighbour, near, far) in shared {
                let (Some(&theirs), Some(&ours)) =
                    (self.cells.get(&neighbour), self.cells.get(&(x, y, z)))
                else {
                    continue;
                };
                let (a, b) = reconcile(theirs[near], ours[far]);
                if let Some(cell) = self.cells.get_mut(&neighbour) {
                    cell[near] = a;
                }
                if let Some(cell) = self.cells.get_mut(&(x, y, z)) {
                    cell[far] = b;
                }
            }
        }
    }

    pub fn get(&self, key: CellKey) -> Option<&Borders> {
        self.cells.get(&key)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Records ordered by layer, then row, then column.
    pub fn records(&self) -> Vec<MinimapRecord> {
        let mut records: Vec<MinimapRecord> = self
            .cells
            .iter()
            .map(|(&(x, y, z), &borders)| MinimapRecord { x, y, z, borders })
            .collect();
        records.sort_by_key(|r| (r.z, r.y, r.x));
        records
    }

    pub fn from_records(records: &[MinimapRecord]) -> Self {
        Self {
            cells: records.iter().map(|r| ((r.x, r.y, r.z), r.borders)).collect(),
        }
    }

    /// JSON bytes for the file that will be written to `path`.
    pub fn to_json(&self, path: &Path) -> Result<Vec<u8>> {
        let mut bytes =
            serde_json::to_vec_pretty(&self.records()).map_err(|e| ImportError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
