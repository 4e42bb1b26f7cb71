//! Typed decoding of editor markup.
//!
//! Every domain type implements [`FromElement`]: it checks the element's tag
//! with [`assert_type`] before reading anything, reads attributes through
//! [`Attrs`] with documented defaults, and dispatches children by tag name.
//! Unknown child tags are ignored.
//!
//! # Example
//!
//! ```ignore
//! use tiledport::parser::parse_markup;
//! use tiledport::schema::{FromElement, TileMap};
//!
//! let root = parse_markup(&std::fs::read_to_string("levels/cave.tmx")?)?;
//! let map = TileMap::from_element(&root)?;
//! println!("{} layers", map.layers.len());
//! ```

mod layer;
mod map;
mod object;
mod property;
mod tileset;
pub mod world;

use std::str::FromStr;

use crate::error::{ImportError, Result};
use crate::parser::Element;
use crate::types::Colour;

pub use layer::{Chunk, Data, Group, ImageLayer, Layer, LayerNode, Placement};
pub use map::{Orientation, RenderOrder, TileMap, TileSetRef};
pub use object::{DrawOrder, MapObject, ObjectGroup, ObjectShape, TextContent};
pub use property::{Properties, Property, PropertyType};
pub use tileset::{Frame, Image, Tile, TileSet};
pub use world::{World, WorldMap};

/// A domain type decoded from one markup element.
pub trait FromElement: Sized {
    /// The tag name this type is decoded from.
    const TAG: &'static str;

    /// Decode from an element. Implementations call [`assert_type`] first.
    fn from_element(element: &Element) -> Result<Self>;
}

/// Fail unless `element` has the expected tag.
pub fn assert_type(element: &Element, expected: &str) -> Result<()> {
    if element.name == expected {
        Ok(())
    } else {
        Err(ImportError::UnexpectedElement {
            expected: expected.to_string(),
            found: element.name.clone(),
        })
    }
}

/// Parse markup text and decode its root as `T`.
pub fn decode_str<T: FromElement>(source: &str) -> Result<T> {
    let root = crate::parser::parse_markup(source)?;
    T::from_element(&root)
}

/// Decode every child with `T`'s tag, in order.
pub(crate) fn decode_children<T: FromElement>(element: &Element) -> Result<Vec<T>> {
    element
        .children_named(T::TAG)
        .map(T::from_element)
        .collect()
}

/// Decode the first child with `T`'s tag, if any.
pub(crate) fn decode_child<T: FromElement>(element: &Element) -> Result<Option<T>> {
    element.child(T::TAG).map(T::from_element).transpose()
}

/// Typed attribute access for one element.
pub(crate) struct Attrs<'a> {
    element: &'a Element,
}

impl<'a> Attrs<'a> {
    pub fn of(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.element.attr(key).map(|s| s.to_string())
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.element.attr(key).unwrap_or(default).to_string()
    }

    pub fn required(&self, key: &str) -> Result<&'a str> {
        self.element
            .attr(key)
            .ok_or_else(|| ImportError::MissingAttribute {
                element: self.element.name.clone(),
                attribute: key.to_string(),
            })
    }

    pub fn int(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self.parsed(key, "an integer")?.unwrap_or(default))
    }

    pub fn uint(&self, key: &str, default: u32) -> Result<u32> {
        Ok(self.parsed(key, "a non-negative integer")?.unwrap_or(default))
    }

    pub fn opt_uint(&self, key: &str) -> Result<Option<u32>> {
        self.parsed(key, "a non-negative integer")
    }

    pub fn double(&self, key: &str, default: f64) -> Result<f64> {
        Ok(self.parsed(key, "a number")?.unwrap_or(default))
    }

    /// Booleans are written as `1`/`0`, properties use `true`/`false`.
    pub fn bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.element.attr(key) {
            None => Ok(default),
            Some(value) => parse_bool(value).ok_or_else(|| self.invalid(key, value, "a boolean")),
        }
    }

    pub fn colour(&self, key: &str) -> Result<Option<Colour>> {
        match self.element.attr(key) {
            None => Ok(None),
            Some(value) => Colour::from_tiled(value)
                .map(Some)
                .ok_or_else(|| self.invalid(key, value, "a #RRGGBB or #AARRGGBB colour")),
        }
    }

    fn parsed<T: FromStr>(&self, key: &str, expected: &'static str) -> Result<Option<T>> {
        match self.element.attr(key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(key, value, expected)),
        }
    }

    fn invalid(&self, key: &str, value: &str, expected: &'static str) -> ImportError {
        ImportError::InvalidAttribute {
            element: self.element.name.clone(),
            attribute: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "True" | "TRUE" => Some(true),
        "0" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_type_mismatch_reports_both_names() {
        let element = Element::new("layer");
        match assert_type(&element, "objectgroup") {
            Err(ImportError::UnexpectedElement { expected, found }) => {
                assert_eq!(expected, "objectgroup");
                assert_eq!(found, "layer");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(assert_type(&element, "layer").is_ok());
    }

    #[test]
    fn test_attrs_defaults_and_parsing() {
        let element = Element::new("layer")
            .with_attr("opacity", "0.5")
            .with_attr("visible", "0")
            .with_attr("width", "12");
        let attrs = Attrs::of(&element);

        assert_eq!(attrs.double("opacity", 1.0).unwrap(), 0.5);
        assert_eq!(attrs.double("parallaxx", 1.0).unwrap(), 1.0);
        assert!(!attrs.bool("visible", true).unwrap());
        assert!(attrs.bool("locked", false).is_ok_and(|b| !b));
        assert_eq!(attrs.uint("width", 0).unwrap(), 12);
        assert_eq!(attrs.int("offsetx", 0).unwrap(), 0);
    }

    #[test]
    fn test_attrs_invalid_values() {
        let element = Element::new("map")
            .with_attr("width", "wide")
            .with_attr("infinite", "maybe")
            .with_attr("backgroundcolor", "#12");
        let attrs = Attrs::of(&element);

        assert!(matches!(
            attrs.uint("width", 0),
            Err(ImportError::InvalidAttribute { .. })
        ));
        assert!(attrs.bool("infinite", false).is_err());
        assert!(attrs.colour("backgroundcolor").is_err());
        assert!(matches!(
            attrs.required("version"),
            Err(ImportError::MissingAttribute { .. })
        ));
    }
}
