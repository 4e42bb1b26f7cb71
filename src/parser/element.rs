//! Generic element tree built from markup events.
//!
//! The builder keeps every in-progress element in an arena and tracks the
//! open ancestry as a stack of arena indices. Once the root closes, the arena
//! is folded into an owned `Element` tree and discarded.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{ImportError, Result};

use super::reader::{MarkupEvent, MarkupReader};

/// A generic markup element: name, attributes, optional text, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder-style text setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|s| s.as_str())
    }

    /// Children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Serialize back to markup.
    ///
    /// Attributes are written in key order; an element without text or
    /// children is written self-closed.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value, true));
        }

        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text, false));
        }
        for child in &self.children {
            child.write_xml(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

fn escape(value: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '\n' if in_attribute => escaped.push_str("&#10;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Arena slot for an element under construction.
struct Node {
    element: Element,
    children: Vec<usize>,
}

/// Single-pass, stack-based tree builder.
#[derive(Default)]
pub struct TreeBuilder {
    arena: Vec<Node>,
    stack: Vec<usize>,
    root: Option<usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed every event from `reader` and return the finished tree.
    pub fn build(mut self, reader: &mut MarkupReader<'_>) -> Result<Element> {
        while let Some(event) = reader.next_event()? {
            match event {
                MarkupEvent::Open {
                    name,
                    attributes,
                    self_closing,
                    ..
                } => self.open(name, attributes, self_closing)?,
                MarkupEvent::Text { text, .. } => self.text(&text),
                MarkupEvent::Close { name, offset } => {
                    let Some(&top) = self.stack.last() else {
                        return Err(ImportError::MismatchedTag {
                            expected: String::new(),
                            found: name,
                            location: reader.locate(offset),
                        });
                    };
                    let expected = &self.arena[top].element.name;
                    if *expected != name {
                        return Err(ImportError::MismatchedTag {
                            expected: expected.clone(),
                            found: name,
                            location: reader.locate(offset),
                        });
                    }
                    self.stack.pop();
                }
            }
        }

        self.finish()
    }

    fn open(
        &mut self,
        name: String,
        attributes: BTreeMap<String, String>,
        self_closing: bool,
    ) -> Result<()> {
        let index = self.arena.len();
        self.arena.push(Node {
            element: Element {
                name,
                attributes,
                text: None,
                children: Vec::new(),
            },
            children: Vec::new(),
        });

        match self.stack.last() {
            Some(&parent) => self.arena[parent].children.push(index),
            None if self.root.is_none() => self.root = Some(index),
            None => {
                return Err(ImportError::NoData {
                    message: format!(
                        "second root element <{}>",
                        self.arena[index].element.name
                    ),
                })
            }
        }

        if !self_closing {
            self.stack.push(index);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        let Some(&top) = self.stack.last() else {
            return;
        };
        let element = &mut self.arena[top].element;
        match &mut element.text {
            Some(existing) => existing.push_str(text),
            None => element.text = Some(text.to_string()),
        }
    }

    fn finish(mut self) -> Result<Element> {
        if let Some(&open) = self.stack.last() {
            return Err(ImportError::NoData {
                message: format!(
                    "unexpected end of input inside <{}>",
                    self.arena[open].element.name
                ),
            });
        }
        let root = self.root.ok_or_else(|| ImportError::NoData {
            message: "no root element".to_string(),
        })?;
        Ok(self.take(root))
    }

    fn take(&mut self, index: usize) -> Element {
        let children = std::mem::take(&mut self.arena[index].children);
        let mut element = std::mem::take(&mut self.arena[index].element);
        element.children = children.into_iter().map(|c| self.take(c)).collect();
        element
    }
}

/// Parse markup text into an element tree.
pub fn parse_markup(source: &str) -> Result<Element> {
    let mut reader = MarkupReader::new(source);
    TreeBuilder::new().build(&mut reader)
}

/// Read and parse a markup file.
pub fn parse_markup_file(path: &Path) -> Result<Element> {
    let source = fs::read_to_string(path).map_err(|e| ImportError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read file: {}", e),
    })?;
    parse_markup(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builds_nested_tree() {
        let root = parse_markup(
            r#"<map version="1.10">
  <tileset firstgid="1" source="walls.tsx"/>
  <layer id="1" name="Ground">
    <data encoding="csv">1,0,
2,3</data>
  </layer>
</map>"#,
        )
        .unwrap();

        assert_eq!(root.name, "map");
        assert_eq!(root.attr("version"), Some("1.10"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].name, "tileset");
        assert!(root.children[0].children.is_empty());

        let data = root.child("layer").and_then(|l| l.child("data")).unwrap();
        assert_eq!(data.text.as_deref(), Some("1,0,\n2,3"));
    }

    #[test]
    fn test_mismatched_close_tag_is_fatal() {
        let err = parse_markup("<a><b></a>").unwrap_err();

        match err {
            ImportError::MismatchedTag { expected, found, .. } => {
                assert_eq!(expected, "b");
                assert_eq!(found, "a");
            }
            other => panic!("expected MismatchedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_document_is_fatal() {
        let err = parse_markup("<a><b/>").unwrap_err();
        assert_eq!(err.status(), crate::import::ImportStatus::FileCorrupt);
    }

    #[test]
    fn test_empty_document_is_fatal() {
        assert!(matches!(
            parse_markup("<?xml version=\"1.0\"?>"),
            Err(ImportError::NoData { .. })
        ));
        assert!(matches!(parse_markup(""), Err(ImportError::NoData { .. })));
    }

    #[test]
    fn test_second_root_is_fatal() {
        assert!(parse_markup("<a/><b/>").is_err());
    }

    #[test]
    fn test_text_split_by_comment_is_joined() {
        let root = parse_markup("<text>Hello<!-- c -->World</text>").unwrap();
        assert_eq!(root.text.as_deref(), Some("HelloWorld"));
    }

    #[test]
    fn test_to_xml_escapes_and_self_closes() {
        let element = Element::new("object")
            .with_attr("name", "say \"hi\" & go")
            .with_child(Element::new("point"))
            .with_child(Element::new("text").with_text("a < b"));

        insta::assert_snapshot!(
            element.to_xml(),
            @r#"<object name="say &quot;hi&quot; &amp; go"><point/><text>a &lt; b</text></object>"#
        );
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let original = Element::new("map")
            .with_attr("orientation", "orthogonal")
            .with_attr("width", "2")
            .with_child(
                Element::new("properties").with_child(
                    Element::new("property")
                        .with_attr("name", "note")
                        .with_attr("value", "line one\nline <two>"),
                ),
            )
            .with_child(
                Element::new("layer")
                    .with_attr("name", "Ground & Sky")
                    .with_child(
                        Element::new("data")
                            .with_attr("encoding", "csv")
                            .with_text("1,2,3,4"),
                    ),
            )
            .with_child(Element::new("objectgroup"));

        let reparsed = parse_markup(&original.to_xml()).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_parse_markup_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.tmx");
        fs::write(&path, "<map><layer/></map>").unwrap();

        let root = parse_markup_file(&path).unwrap();
        assert_eq!(root.children[0].name, "layer");

        assert!(parse_markup_file(&dir.path().join("missing.tmx")).is_err());
    }
}
