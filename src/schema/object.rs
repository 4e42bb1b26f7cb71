//! Object groups and the objects they hold.

use serde::Serialize;

use crate::error::{ImportError, Result};
use crate::parser::Element;
use crate::types::Colour;

use super::layer::Placement;
use super::property::Properties;
use super::{assert_type, Attrs, FromElement};

/// Object rendering order inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawOrder {
    #[default]
    TopDown,
    Index,
}

/// Text carried by a text object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub text: String,
    pub wrap: bool,
    pub font_family: Option<String>,
    pub pixel_size: u32,
    pub colour: Option<Colour>,
}

/// Geometry of a map object.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "lowercase")]
pub enum ObjectShape {
    #[default]
    Rectangle,
    Ellipse,
    Point,
    /// Closed outline, relative to the object position.
    Polygon(Vec<(f64, f64)>),
    /// Open outline, relative to the object position.
    Polyline(Vec<(f64, f64)>),
    Text(TextContent),
}

/// A single object in an object group or a tile's collision group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    /// Free-form type tag (`type`, or `class` in newer files).
    pub object_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub gid: Option<u32>,
    pub visible: bool,
    pub template: Option<String>,
    pub shape: ObjectShape,
    pub properties: Properties,
}

impl FromElement for MapObject {
    const TAG: &'static str = "object";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);

        let object_type = attrs
            .string("type")
            .or_else(|| attrs.string("class"))
            .unwrap_or_default();

        Ok(Self {
            id: attrs.uint("id", 0)?,
            name: attrs.string_or("name", ""),
            object_type,
            x: attrs.double("x", 0.0)?,
            y: attrs.double("y", 0.0)?,
            width: attrs.double("width", 0.0)?,
            height: attrs.double("height", 0.0)?,
            rotation: attrs.double("rotation", 0.0)?,
            gid: attrs.opt_uint("gid")?,
            visible: attrs.bool("visible", true)?,
            template: attrs.string("template"),
            shape: read_shape(element)?,
            properties: Properties::of(element)?,
        })
    }
}

impl MapObject {
    /// True when the object has no area and no outline.
    pub fn is_degenerate(&self) -> bool {
        match &self.shape {
            ObjectShape::Point => true,
            ObjectShape::Rectangle | ObjectShape::Ellipse => {
                self.width == 0.0 && self.height == 0.0
            }
            ObjectShape::Polygon(points) | ObjectShape::Polyline(points) => points.is_empty(),
            ObjectShape::Text(_) => false,
        }
    }
}

fn read_shape(element: &Element) -> Result<ObjectShape> {
    for child in &element.children {
        let shape = match child.name.as_str() {
            "ellipse" => ObjectShape::Ellipse,
            "point" => ObjectShape::Point,
            "polygon" => ObjectShape::Polygon(read_points(child)?),
            "polyline" => ObjectShape::Polyline(read_points(child)?),
            "text" => ObjectShape::Text(read_text(child)?),
            _ => continue,
        };
        return Ok(shape);
    }
    Ok(ObjectShape::Rectangle)
}

/// Parse a `points="x,y x,y ..."` list.
fn read_points(element: &Element) -> Result<Vec<(f64, f64)>> {
    let raw = Attrs::of(element).required("points")?;
    let invalid = || ImportError::InvalidAttribute {
        element: element.name.clone(),
        attribute: "points".to_string(),
        value: raw.to_string(),
        expected: "space-separated x,y pairs",
    };

    raw.split_whitespace()
        .map(|pair| -> Result<(f64, f64)> {
            let (x, y) = pair.split_once(',').ok_or_else(invalid)?;
            let x = x.trim().parse().map_err(|_| invalid())?;
            let y = y.trim().parse().map_err(|_| invalid())?;
            Ok((x, y))
        })
        .collect()
}

fn read_text(element: &Element) -> Result<TextContent> {
    let attrs = Attrs::of(element);
    Ok(TextContent {
        text: element.text.clone().unwrap_or_default(),
        wrap: attrs.bool("wrap", false)?,
        font_family: attrs.string("fontfamily"),
        pixel_size: attrs.uint("pixelsize", 16)?,
        colour: attrs.colour("color")?,
    })
}

/// A layer of free-form objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectGroup {
    pub id: u32,
    pub name: String,
    pub class: Option<String>,
    pub placement: Placement,
    pub colour: Option<Colour>,
    pub draw_order: DrawOrder,
    pub objects: Vec<MapObject>,
    pub properties: Properties,
}

impl FromElement for ObjectGroup {
    const TAG: &'static str = "objectgroup";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);

        let draw_order = match element.attr("draworder") {
            None | Some("topdown") => DrawOrder::TopDown,
            Some("index") => DrawOrder::Index,
            Some(other) => {
                return Err(ImportError::InvalidAttribute {
                    element: element.name.clone(),
                    attribute: "draworder".to_string(),
                    value: other.to_string(),
                    expected: "topdown or index",
                })
            }
        };

        Ok(Self {
            id: attrs.uint("id", 0)?,
            name: attrs.string_or("name", ""),
            class: attrs.string("class"),
            placement: Placement::read(element)?,
            colour: attrs.colour("color")?,
            draw_order,
            objects: super::decode_children(element)?,
            properties: Properties::of(element)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markup;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_object_group() {
        let root = parse_markup(
            r##"<objectgroup id="4" name="triggers" color="#00ff00" draworder="index" opacity="0.25">
  <object id="1" name="exit" type="DoorTrigger" x="32" y="48" width="16" height="32"/>
  <object id="2" x="0" y="0"><point/></object>
  <object id="3" class="Spike" x="8" y="8">
    <polygon points="0,0 16,0 8,-8"/>
  </object>
</objectgroup>"##,
        )
        .unwrap();

        let group = ObjectGroup::from_element(&root).unwrap();
        assert_eq!(group.name, "triggers");
        assert_eq!(group.draw_order, DrawOrder::Index);
        assert_eq!(group.colour, Some(Colour::rgb(0, 255, 0)));
        assert_eq!(group.placement.opacity, 0.25);
        assert_eq!(group.objects.len(), 3);

        let exit = &group.objects[0];
        assert_eq!(exit.object_type, "DoorTrigger");
        assert_eq!((exit.x, exit.y, exit.width, exit.height), (32.0, 48.0, 16.0, 32.0));
        assert_eq!(exit.shape, ObjectShape::Rectangle);

        assert_eq!(group.objects[1].shape, ObjectShape::Point);
        assert!(group.objects[1].is_degenerate());

        let spike = &group.objects[2];
        assert_eq!(spike.object_type, "Spike");
        assert_eq!(
            spike.shape,
            ObjectShape::Polygon(vec![(0.0, 0.0), (16.0, 0.0), (8.0, -8.0)])
        );
    }

    #[test]
    fn test_tile_object_and_text() {
        let root = parse_markup(
            r#"<object id="9" gid="2147483654" x="0" y="16" width="16" height="16" rotation="90">
  <text wrap="1" pixelsize="12">Hello</text>
</object>"#,
        )
        .unwrap();

        let object = MapObject::from_element(&root).unwrap();
        assert_eq!(object.gid, Some(0x8000_0006));
        assert_eq!(object.rotation, 90.0);
        match object.shape {
            ObjectShape::Text(text) => {
                assert_eq!(text.text, "Hello");
                assert!(text.wrap);
                assert_eq!(text.pixel_size, 12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_polyline_and_bad_points() {
        let line = Element::new("object").with_child(
            Element::new("polyline").with_attr("points", "0,0 4,4"),
        );
        assert_eq!(
            MapObject::from_element(&line).unwrap().shape,
            ObjectShape::Polyline(vec![(0.0, 0.0), (4.0, 4.0)])
        );

        let bad = Element::new("object")
            .with_child(Element::new("polygon").with_attr("points", "0,0 4"));
        assert!(matches!(
            MapObject::from_element(&bad),
            Err(ImportError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_unknown_draw_order_is_error() {
        let element = Element::new("objectgroup").with_attr("draworder", "random");
        assert!(ObjectGroup::from_element(&element).is_err());
    }
}
