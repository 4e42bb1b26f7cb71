//! Custom properties attached to maps, layers, tilesets, tiles and objects.

use serde::Serialize;

use crate::error::Result;
use crate::parser::Element;
use crate::types::Colour;

use super::{assert_type, parse_bool, Attrs, FromElement};

/// Declared type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Color,
    File,
    Object,
    Class,
}

impl PropertyType {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "color" => Some(Self::Color),
            "file" => Some(Self::File),
            "object" => Some(Self::Object),
            "class" => Some(Self::Class),
            _ => None,
        }
    }
}

/// A single named property. The value is kept as written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub value: String,
    /// Members of a `class` property.
    #[serde(skip_serializing_if = "Properties::is_empty")]
    pub members: Properties,
}

impl FromElement for Property {
    const TAG: &'static str = "property";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        let attrs = Attrs::of(element);

        let name = attrs.required("name")?.to_string();
        let property_type = match element.attr("type") {
            None => PropertyType::String,
            Some(tag) => PropertyType::from_tag(tag).ok_or_else(|| {
                crate::error::ImportError::InvalidAttribute {
                    element: element.name.clone(),
                    attribute: "type".to_string(),
                    value: tag.to_string(),
                    expected: "string, int, float, bool, color, file, object or class",
                }
            })?,
        };

        // Multi-line strings are stored as element text instead of `value`.
        let value = attrs
            .string("value")
            .or_else(|| element.text.clone())
            .unwrap_or_default();

        let members = match element.child(Properties::TAG) {
            Some(child) => Properties::from_element(child)?,
            None => Properties::default(),
        };

        Ok(Self {
            name,
            property_type,
            value,
            members,
        })
    }
}

/// An ordered property list.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Properties(pub Vec<Property>);

impl FromElement for Properties {
    const TAG: &'static str = "properties";

    fn from_element(element: &Element) -> Result<Self> {
        assert_type(element, Self::TAG)?;
        super::decode_children(element).map(Properties)
    }
}

impl Properties {
    /// Decode the `<properties>` child of `owner`, or an empty list.
    pub(crate) fn of(owner: &Element) -> Result<Self> {
        Ok(super::decode_child(owner)?.unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.iter()
    }

    /// Look up a property by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.value.as_str())
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|p| p.value.trim().parse().ok())
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|p| p.value.trim().parse().ok())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|p| parse_bool(&p.value))
    }

    pub fn get_colour(&self, name: &str) -> Option<Colour> {
        self.get(name).and_then(|p| Colour::from_tiled(&p.value))
    }
}
