//! Layer containers: tile layers, image layers, groups, and the tagged
//! union that holds any of them.

use serde::Serialize;

use crate::error::{ImportError, Result};
use crate::parser::Element;
use crate::types::Colour;

use super::object::ObjectGroup;
use super::property::Properties;
use super::tileset::Image;
use super::{assert_type, decode_child, Attrs, FromElement};

/// Placement attributes shared by every layer kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f64,
    pub visible: bool,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<Colour>,
    pub parallax_x: f64,
    pub parallax_y: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: 1.0,
            visible: true,
            locked: false,
            tint: None,
            parallax_x: 1.0,
            parallax_y: 1.0,
        }
    }
}

impl Placement {
    pub(crate) fn read(element: &Element) -> Result<Self> {
        let attrs = Attrs::of(element);
        Ok(Self {
            offset_x: attrs.double("offsetx", 0.0)?,
            offset_y: attrs.double("offsety", 0.0)?,
            opacity: attrs.double("opacity", 1.0)?,
            visible: attrs.bool("visible", true)?,
            locked: attrs.bool("locked", false)?,
            tint: attrs.colour("tintcolor")?,
            parallax_x: attrs.double("parallaxx", 1.0)?,
            parallax_y: attrs.double("parallaxy", 1.0)?,
        })
    }

    /// Tint colour with alpha scaled by opacity, as `[0, 1]` RGBA.
    pub fn modulate(&self) -> [f32; 4] {
        self.tint.unwrap_or_default().modulate(self.opacity)
    }
}

/// One chunk of an infinite map's layer data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub text: Option<String>,
}

impl FromElement for Chunk {
    const TAG: &'static str = "chunk";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            x: attrs.int("x", 0)?,
            y: attrs.int("y", 0)?,
            width: attrs.uint("width", 0)?,
            height: attrs.uint("height", 0)?,
            text: element.text.clone(),
        })
    }
}

/// Raw layer payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Data {
    pub encoding: Option<String>,
    pub compression: Option<String>,
    pub text: Option<String>,
    pub chunks: Vec<Chunk>,
}

impl FromElement for Data {
    const TAG: &'static str = "data";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            encoding: attrs.string("encoding"),
            compression: attrs.string("compression"),
            text: element.text.clone(),
            chunks: super::decode_children(element)?,
        })
    }
}

impl Data {
    /// Decode comma-separated cell values.
    ///
    /// Only uncompressed `csv` payloads are accepted, and the payload must
    /// hold exactly `width * height` cells.
    pub fn decode_csv(&self, width: u32, height: u32) -> std::result::Result<Vec<u32>, String> {
        match self.encoding.as_deref() {
            Some("csv") => {}
            Some(other) => return Err(format!("unsupported encoding '{}'", other)),
            None => return Err("unsupported encoding 'xml' (expected csv)".to_string()),
        }
        if let Some(compression) = &self.compression {
            return Err(format!("unsupported compression '{}'", compression));
        }

        let text = match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Err("empty payload".to_string()),
        };

        let cells = text
            .split(|c: char| c == ',' || c == '\n' || c == '\r')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(|cell| {
                cell.parse::<u32>()
                    .map_err(|_| format!("malformed cell '{}'", cell))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(format!(
                "expected {} cells ({}x{}), found {}",
                expected,
                width,
                height,
                cells.len()
            ));
        }
        Ok(cells)
    }
}

/// A tile layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: u32,
    pub name: String,
    pub class: Option<String>,
    pub width: u32,
    pub height: u32,
    pub placement: Placement,
    pub data: Option<Data>,
    pub properties: Properties,
}

impl FromElement for Layer {
    const TAG: &'static str = "layer";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            id: attrs.uint("id", 0)?,
            name: attrs.string_or("name", ""),
            class: attrs.string("class"),
            width: attrs.uint("width", 0)?,
            height: attrs.uint("height", 0)?,
            placement: Placement::read(element)?,
            data: decode_child(element)?,
            properties: Properties::of(element)?,
        })
    }
}

impl Layer {
    /// Decoded cell values in row-major order.
    pub fn cells(&self) -> Result<Vec<u32>> {
        let data = self.data.as_ref().ok_or_else(|| self.data_error("no data element"))?;
        data.decode_csv(self.width, self.height)
            .map_err(|message| self.data_error(&message))
    }

    fn data_error(&self, message: &str) -> ImportError {
        ImportError::LayerData {
            layer: self.name.clone(),
            message: message.to_string(),
        }
    }
}

/// A layer showing a single image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    pub id: u32,
    pub name: String,
    pub class: Option<String>,
    pub placement: Placement,
    pub image: Option<Image>,
    pub repeat_x: bool,
    pub repeat_y: bool,
    pub properties: Properties,
}

impl FromElement for ImageLayer {
    const TAG: &'static str = "imagelayer";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            id: attrs.uint("id", 0)?,
            name: attrs.string_or("name", ""),
            class: attrs.string("class"),
            placement: Placement::read(element)?,
            image: decode_child(element)?,
            repeat_x: attrs.bool("repeatx", false)?,
            repeat_y: attrs.bool("repeaty", false)?,
            properties: Properties::of(element)?,
        })
    }
}

/// A group of layers. Groups nest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: u32,
    pub name: String,
    pub class: Option<String>,
    pub placement: Placement,
    pub layers: Vec<LayerNode>,
    pub properties: Properties,
}

impl FromElement for Group {
    const TAG: &'static str = "group";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);
        Ok(Self {
            id: attrs.uint("id", 0)?,
            name: attrs.string_or("name", ""),
            class: attrs.string("class"),
            placement: Placement::read(element)?,
            layers: LayerNode::decode_all(element)?,
            properties: Properties::of(element)?,
        })
    }
}

/// Any child of a map or group that is itself a layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerNode {
    Tiles(Layer),
    Objects(ObjectGroup),
    Image(ImageLayer),
    Group(Group),
}

impl LayerNode {
    /// Decode a child element if its tag names a layer kind.
    pub fn from_child(element: &Element) -> Result<Option<Self>> {
        let node = match element.name.as_str() {
            "layer" => LayerNode::Tiles(Layer::from_element(element)?),
            "objectgroup" => LayerNode::Objects(ObjectGroup::from_element(element)?),
            "imagelayer" => LayerNode::Image(ImageLayer::from_element(element)?),
            "group" => LayerNode::Group(Group::from_element(element)?),
            _ => return Ok(None),
        };
        Ok(Some(node))
    }

    /// Decode every layer-kind child of `parent`, keeping document order.
    pub fn decode_all(parent: &Element) -> Result<Vec<Self>> {
        let mut layers = Vec::new();
        for child in &parent.children {
            if let Some(node) = Self::from_child(child)? {
                layers.push(node);
            }
        }
        Ok(layers)
    }

    pub fn name(&self) -> &str {
        match self {
            LayerNode::Tiles(l) => &l.name,
            LayerNode::Objects(g) => &g.name,
            LayerNode::Image(l) => &l.name,
            LayerNode::Group(g) => &g.name,
        }
    }

    pub fn placement(&self) -> &Placement {
        match self {
            LayerNode::Tiles(l) => &l.placement,
            LayerNode::Objects(g) => &g.placement,
            LayerNode::Image(l) => &l.placement,
            LayerNode::Group(g) => &g.placement,
        }
    }
}
