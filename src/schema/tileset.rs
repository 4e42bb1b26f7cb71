//! Tilesets, embedded or loaded from a standalone tileset file.

use serde::Serialize;

use crate::error::Result;
use crate::parser::Element;
use crate::types::Colour;

use super::object::ObjectGroup;
use super::property::Properties;
use super::{assert_type, decode_child, decode_children, Attrs, FromElement};

/// A referenced image file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    /// Path relative to the file that declared the image.
    pub source: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Colour treated as transparent.
    pub trans: Option<Colour>,
}

impl FromElement for Image {
    const TAG: &'static str = "image";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            source: attrs.string("source").filter(|s| !s.is_empty()),
            width: attrs.opt_uint("width")?,
            height: attrs.opt_uint("height")?,
            trans: attrs.colour("trans")?,
        })
    }
}

/// One animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub tile_id: u32,
    /// Milliseconds.
    pub duration: u32,
}

impl FromElement for Frame {
    const TAG: &'static str = "frame";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            tile_id: attrs.uint("tileid", 0)?,
            duration: attrs.uint("duration", 0)?,
        })
    }
}

/// Per-tile metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Local tile ID within the tileset.
    pub id: u32,
    pub tile_type: Option<String>,
    pub probability: f64,
    pub image: Option<Image>,
    /// Collision shapes.
    pub object_group: Option<ObjectGroup>,
    pub animation: Vec<Frame>,
    pub properties: Properties,
}

impl FromElement for Tile {
    const TAG: &'static str = "tile";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);

        let animation = match element.child("animation") {
            Some(animation) => decode_children(animation)?,
            None => Vec::new(),
        };

        Ok(Self {
            id: attrs.uint("id", 0)?,
            tile_type: attrs.string("type").or_else(|| attrs.string("class")),
            probability: attrs.double("probability", 1.0)?,
            image: decode_child(element)?,
            object_group: decode_child(element)?,
            animation,
            properties: Properties::of(element)?,
        })
    }
}

/// A tileset definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSet {
    pub name: String,
    pub class: Option<String>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    /// Zero when the file leaves it out.
    pub columns: u32,
    pub object_alignment: Option<String>,
    pub tile_offset: (i64, i64),
    pub image: Option<Image>,
    pub tiles: Vec<Tile>,
    pub properties: Properties,
}

impl FromElement for TileSet {
    const TAG: &'static str = "tileset";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);

        let tile_offset = match element.child("tileoffset") {
            Some(offset) => {
                let offset = Attrs::of(offset);
                (offset.int("x", 0)?, offset.int("y", 0)?)
            }
            None => (0, 0),
        };

        Ok(Self {
            name: attrs.string_or("name", ""),
            class: attrs.string("class"),
            tile_width: attrs.uint("tilewidth", 0)?,
            tile_height: attrs.uint("tileheight", 0)?,
            spacing: attrs.uint("spacing", 0)?,
            margin: attrs.uint("margin", 0)?,
            tile_count: attrs.uint("tilecount", 0)?,
            columns: attrs.uint("columns", 0)?,
            object_alignment: attrs.string("objectalignment"),
            tile_offset,
            image: decode_child(element)?,
            tiles: decode_children(element)?,
            properties: Properties::of(element)?,
        })
    }
}

impl TileSet {
    /// Metadata for a local tile ID, if the tileset declares any.
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Column count, derived from the image width when not declared.
    pub fn columns_for_width(&self, image_width: u32) -> u32 {
        if self.columns > 0 {
            return self.columns;
        }
        // u64: margin and spacing come straight from the file.
        let (spacing, margin) = (u64::from(self.spacing), u64::from(self.margin));
        let stride = u64::from(self.tile_width) + spacing;
        if stride == 0 {
            return 0;
        }
        let usable = u64::from(image_width).saturating_sub(2 * margin);
        u32::try_from((usable + spacing) / stride).unwrap_or(u32::MAX)
    }
}
