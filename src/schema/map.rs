//! The map root and its tileset references.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{ImportError, Result};
use crate::parser::Element;
use crate::types::Colour;

use super::layer::{Group, ImageLayer, Layer, LayerNode};
use super::object::ObjectGroup;
use super::property::Properties;
use super::tileset::TileSet;
use super::{assert_type, Attrs, FromElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl Orientation {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "orthogonal" => Some(Self::Orthogonal),
            "isometric" => Some(Self::Isometric),
            "staggered" => Some(Self::Staggered),
            "hexagonal" => Some(Self::Hexagonal),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Orthogonal => "orthogonal",
            Self::Isometric => "isometric",
            Self::Staggered => "staggered",
            Self::Hexagonal => "hexagonal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderOrder {
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

impl RenderOrder {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "right-down" => Some(Self::RightDown),
            "right-up" => Some(Self::RightUp),
            "left-down" => Some(Self::LeftDown),
            "left-up" => Some(Self::LeftUp),
            _ => None,
        }
    }
}

/// A tileset as declared by a map: external file or embedded definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSetRef {
    pub first_gid: u32,
    /// External tileset file, relative to the map.
    pub source: Option<String>,
    /// Embedded definition when there is no `source`.
    pub inline: Option<TileSet>,
}

impl FromElement for TileSetRef {
    const TAG: &'static str = "tileset";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        let source = attrs.string("source");
        let inline = match source {
            Some(_) => None,
            None => Some(TileSet::from_element(element)?),
        };
        Ok(Self {
            first_gid: attrs.uint("firstgid", 1)?,
            source,
            inline,
        })
    }
}

impl TileSetRef {
    /// Atlas name: the embedded tileset's name, or the source file stem.
    pub fn name(&self) -> String {
        if let Some(tileset) = &self.inline {
            return tileset.name.clone();
        }
        self.source
            .as_deref()
            .and_then(|s| Path::new(s).file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A decoded map file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileMap {
    pub version: String,
    pub tiled_version: Option<String>,
    pub class: Option<String>,
    pub orientation: Orientation,
    pub render_order: RenderOrder,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub infinite: bool,
    pub next_layer_id: u32,
    pub next_object_id: u32,
    pub background: Option<Colour>,
    pub tilesets: Vec<TileSetRef>,
    /// Top-level layers in document order.
    pub layers: Vec<LayerNode>,
    pub properties: Properties,
}

impl FromElement for TileMap {
    const TAG: &'static str = "map";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);

        let orientation = match element.attr("orientation") {
            None => Orientation::Orthogonal,
            Some(value) => Orientation::parse(value).ok_or_else(|| {
                invalid(
                    element,
                    "orientation",
                    value,
                    "orthogonal, isometric, staggered or hexagonal",
                )
            })?,
        };
        let render_order = match element.attr("renderorder") {
            None => RenderOrder::RightDown,
            Some(value) => RenderOrder::parse(value).ok_or_else(|| {
                invalid(
                    element,
                    "renderorder",
                    value,
                    "right-down, right-up, left-down or left-up",
                )
            })?,
        };

        Ok(Self {
            version: attrs.required("version")?.to_string(),
            tiled_version: attrs.string("tiledversion"),
            class: attrs.string("class"),
            orientation,
            render_order,
            width: attrs.uint("width", 0)?,
            height: attrs.uint("height", 0)?,
            tile_width: attrs.uint("tilewidth", 0)?,
            tile_height: attrs.uint("tileheight", 0)?,
            infinite: attrs.bool("infinite", false)?,
            next_layer_id: attrs.uint("nextlayerid", 0)?,
            next_object_id: attrs.uint("nextobjectid", 0)?,
            background: attrs.colour("backgroundcolor")?,
            tilesets: super::decode_children(element)?,
            layers: LayerNode::decode_all(element)?,
            properties: Properties::of(element)?,
        })
    }
}

fn invalid(element: &Element, attribute: &str, value: &str, expected: &'static str) -> ImportError {
    ImportError::InvalidAttribute {
        element: element.name.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        expected,
    }
}

impl TileMap {
    /// Reject maps the assembler cannot lay out.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.orientation != Orientation::Orthogonal {
            return Err(ImportError::UnsupportedOrientation(self.orientation.to_string()));
        }
        if self.infinite {
            return Err(ImportError::InfiniteMap);
        }
        Ok(())
    }

    /// Top-level tile layers.
    pub fn tile_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter_map(|node| match node {
            LayerNode::Tiles(layer) => Some(layer),
            _ => None,
        })
    }

    /// Top-level groups.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.layers.iter().filter_map(|node| match node {
            LayerNode::Group(group) => Some(group),
            _ => None,
        })
    }

    /// Top-level object groups.
    pub fn object_groups(&self) -> impl Iterator<Item = &ObjectGroup> {
        self.layers.iter().filter_map(|node| match node {
            LayerNode::Objects(group) => Some(group),
            _ => None,
        })
    }

    /// Top-level image layers.
    pub fn image_layers(&self) -> impl Iterator<Item = &ImageLayer> {
        self.layers.iter().filter_map(|node| match node {
            LayerNode::Image(layer) => Some(layer),
            _ => None,
        })
    }

    /// Every tile layer, descending into groups.
    pub fn all_tile_layers(&self) -> Vec<&Layer> {
        fn walk<'a>(nodes: &'a [LayerNode], out: &mut Vec<&'a Layer>) {
            for node in nodes {
                match node {
                    LayerNode::Tiles(layer) => out.push(layer),
                    LayerNode::Group(group) => walk(&group.layers, out),
                    LayerNode::Objects(_) | LayerNode::Image(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.layers, &mut out);
        out
    }

    /// Every object group, descending into groups.
    pub fn all_object_groups(&self) -> Vec<&ObjectGroup> {
        fn walk<'a>(nodes: &'a [LayerNode], out: &mut Vec<&'a ObjectGroup>) {
            for node in nodes {
                match node {
                    LayerNode::Objects(group) => out.push(group),
                    LayerNode::Group(group) => walk(&group.layers, out),
                    LayerNode::Tiles(_) | LayerNode::Image(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.layers, &mut out);
        out
    }

    /// Pixel size of the whole map. Fails when it does not fit in a `u32`.
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        let side = |tiles: u32, tile: u32, attribute: &str| {
            tiles.checked_mul(tile).ok_or_else(|| ImportError::InvalidAttribute {
                element: "map".to_string(),
                attribute: attribute.to_string(),
                value: tiles.to_string(),
                expected: "a map whose pixel size fits in 32 bits",
            })
        };
        Ok((
            side(self.width, self.tile_width, "width")?,
            side(self.height, self.tile_height, "height")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markup;
    use pretty_assertions::assert_eq;

    const ROOM: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" tiledversion="1.10.2" orientation="orthogonal" renderorder="right-down"
     width="4" height="2" tilewidth="16" tileheight="16" infinite="0"
     backgroundcolor="#202030" nextlayerid="5" nextobjectid="3">
  <properties>
    <property name="layer" type="int" value="2"/>
  </properties>
  <tileset firstgid="1" source="walls.tsx"/>
  <tileset firstgid="9" name="props" tilewidth="16" tileheight="16" tilecount="4" columns="2">
    <image source="props.png" width="32" height="32"/>
  </tileset>
  <layer id="1" name="collision" width="4" height="2">
    <data encoding="csv">
1,1,1,1,
0,0,9,0
</data>
  </layer>
  <objectgroup id="2" name="spawns">
    <object id="1" type="Player" x="8" y="8"><point/></object>
  </objectgroup>
  <group id="3" name="decor">
    <layer id="4" name="vines" width="4" height="2"><data encoding="csv">0,0,0,0,0,0,0,0</data></layer>
  </group>
</map>"##;

    #[test]
    fn test_decode_map() {
        let map = TileMap::from_element(&parse_markup(ROOM).unwrap()).unwrap();

        assert_eq!(map.version, "1.10");
        assert_eq!(map.tiled_version.as_deref(), Some("1.10.2"));
        assert_eq!(map.orientation, Orientation::Orthogonal);
        assert_eq!(map.render_order, RenderOrder::RightDown);
        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.pixel_size().unwrap(), (64, 32));
        assert!(!map.infinite);
        assert_eq!(map.next_layer_id, 5);
        assert_eq!(map.background, Some(Colour::rgb(0x20, 0x20, 0x30)));
        assert_eq!(map.properties.get_int("layer"), Some(2));

        assert_eq!(map.tilesets.len(), 2);
        assert_eq!(map.tilesets[0].first_gid, 1);
        assert_eq!(map.tilesets[0].name(), "walls");
        assert!(map.tilesets[0].inline.is_none());
        assert_eq!(map.tilesets[1].first_gid, 9);
        assert_eq!(map.tilesets[1].name(), "props");

        assert_eq!(map.tile_layers().count(), 1);
        assert_eq!(map.object_groups().count(), 1);
        assert_eq!(map.groups().count(), 1);
        assert_eq!(map.image_layers().count(), 0);

        let names: Vec<_> = map.all_tile_layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["collision", "vines"]);
        assert!(map.ensure_supported().is_ok());
    }

    #[test]
    fn test_version_is_required() {
        let root = parse_markup(r#"<map width="1" height="1"/>"#).unwrap();
        assert!(matches!(
            TileMap::from_element(&root),
            Err(ImportError::MissingAttribute { attribute, .. }) if attribute == "version"
        ));
    }

    #[test]
    fn test_unsupported_maps_are_rejected() {
        let iso = parse_markup(r#"<map version="1.10" orientation="isometric"/>"#).unwrap();
        let map = TileMap::from_element(&iso).unwrap();
        assert!(matches!(
            map.ensure_supported(),
            Err(ImportError::UnsupportedOrientation(o)) if o == "isometric"
        ));

        let infinite = parse_markup(r#"<map version="1.10" infinite="1"/>"#).unwrap();
        let map = TileMap::from_element(&infinite).unwrap();
        assert!(matches!(map.ensure_supported(), Err(ImportError::InfiniteMap)));
    }

    #[test]
    fn test_unknown_orientation_is_decode_error() {
        let root = parse_markup(r#"<map version="1.10" orientation="spherical"/>"#).unwrap();
        assert!(matches!(
            TileMap::from_element(&root),
            Err(ImportError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_oversized_pixel_size_is_an_error() {
        let root = parse_markup(
            r#"<map version="1.10" width="70000" height="1" tilewidth="70000" tileheight="16"/>"#,
        )
        .unwrap();
        let map = TileMap::from_element(&root).unwrap();
        assert!(matches!(
            map.pixel_size(),
            Err(ImportError::InvalidAttribute { attribute, .. }) if attribute == "width"
        ));
    }
}
