//! Tile occupancy queried by the border classifier.

use crate::error::Result;
use crate::schema::{Layer, TileMap};
use crate::types::Gid;

/// Which tiles of a map are filled. Out-of-range queries are empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Occupancy of a decoded tile layer.
    pub fn from_layer(layer: &Layer) -> Result<Self> {
        let cells = layer
            .cells()?
            .into_iter()
            .map(|raw| !Gid::from_raw(raw).is_empty())
            .collect();
        Ok(Self {
            width: layer.width,
            height: layer.height,
            cells,
        })
    }

    /// Occupancy of the map's collision layer.
    ///
    /// The layer is matched by name, ignoring case, anywhere in the layer
    /// tree; without a match the first tile layer is used. A map with no
    /// tile layers is entirely empty.
    pub fn from_map(map: &TileMap, collision_layer: &str) -> Result<Self> {
        let layers = map.all_tile_layers();
        let layer = layers
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(collision_layer))
            .or_else(|| layers.first());
        match layer {
            Some(layer) => Self::from_layer(layer),
            None => Ok(Self::new(map.width, map.height)),
        }
    }

    /// Build from text rows, `#` marking a filled tile.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    grid.set(x as u32, y as u32, true);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: u32, y: u32, occupied: bool) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            self.cells[index] = occupied;
        }
    }

    pub fn is_occupied(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.cells.get(index).copied().unwrap_or(false)
    }
}
