//! Per-import state and global tile ID resolution.
//!
//! An [`ImportSession`] is built for one map import from the map's tileset
//! references and is dropped when the import finishes. It owns the sorted
//! firstgid table and the atlas column counts, so nothing leaks between
//! imports.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ImportError, Result};
use crate::schema::TileSetRef;
use crate::types::Gid;

/// A tileset's slot in the map-wide GID range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetEntry {
    pub first_gid: u32,
    pub name: String,
}

/// A packed cell value resolved to an atlas tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTile {
    pub atlas: String,
    /// Tile ID local to the owning tileset.
    pub local_id: u32,
    /// Column and row inside the atlas.
    pub coords: (u32, u32),
    pub flip_h: bool,
    pub flip_v: bool,
    pub flip_d: bool,
}

#[derive(Debug, Default)]
pub struct ImportSession {
    /// Sorted by `first_gid`, no duplicates.
    entries: Vec<TilesetEntry>,
    columns: BTreeMap<String, u32>,
    duplicates: Vec<u32>,
}

impl ImportSession {
    /// Build the GID table from a map's tileset declarations.
    ///
    /// Entries are sorted by firstgid. When two declarations share a firstgid
    /// the later one wins and the value is recorded in
    /// [`duplicate_first_gids`](Self::duplicate_first_gids).
    pub fn new(refs: &[TileSetRef]) -> Self {
        let mut declared: Vec<TilesetEntry> = refs
            .iter()
            .map(|r| TilesetEntry {
                first_gid: r.first_gid,
                name: r.name(),
            })
            .collect();
        // Stable, so equal firstgids stay in declaration order.
        declared.sort_by_key(|e| e.first_gid);

        let mut entries: Vec<TilesetEntry> = Vec::with_capacity(declared.len());
        let mut duplicates = Vec::new();
        for entry in declared {
            match entries.last_mut() {
                Some(last) if last.first_gid == entry.first_gid => {
                    duplicates.push(entry.first_gid);
                    *last = entry;
                }
                _ => entries.push(entry),
            }
        }

        Self {
            entries,
            columns: BTreeMap::new(),
            duplicates,
        }
    }

    /// Record the column count of an atlas available to this import.
    pub fn register_atlas(&mut self, name: impl Into<String>, columns: u32) {
        self.columns.insert(name.into(), columns);
    }

    pub fn has_atlas(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn entries(&self) -> &[TilesetEntry] {
        &self.entries
    }

    pub fn duplicate_first_gids(&self) -> &[u32] {
        &self.duplicates
    }

    /// The tileset with the greatest firstgid not above `gid`.
    pub fn owner(&self, gid: u32) -> Result<&TilesetEntry> {
        let index = self.entries.partition_point(|e| e.first_gid <= gid);
        if index == 0 {
            return Err(ImportError::NoTileForGid { gid, layer: None });
        }
        Ok(&self.entries[index - 1])
    }

    /// Resolve a packed cell value. Empty cells resolve to `None`.
    pub fn resolve(&self, raw: u32) -> Result<Option<ResolvedTile>> {
        let gid = Gid::from_raw(raw);
        if gid.is_empty() {
            return Ok(None);
        }

        let owner = self.owner(gid.id)?;
        let columns = *self
            .columns
            .get(&owner.name)
            .ok_or_else(|| ImportError::TilesetNotFound {
                name: owner.name.clone(),
                layer: None,
            })?;

        let local_id = gid.id - owner.first_gid;
        // Image-collection tilesets have no grid; lay them out as one row.
        let coords = if columns == 0 {
            (local_id, 0)
        } else {
            (local_id % columns, local_id / columns)
        };

        Ok(Some(ResolvedTile {
            atlas: owner.name.clone(),
            local_id,
            coords,
            flip_h: gid.flip_h,
            flip_v: gid.flip_v,
            flip_d: gid.flip_d,
        }))
    }
}
