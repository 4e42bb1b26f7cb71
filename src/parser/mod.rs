//! Markup parsing for tile-map editor files.
//!
//! This module turns raw map (`.tmx`) and tileset (`.tsx`) markup into a
//! generic `Element` tree. It knows nothing about the map schema; typed
//! decoding happens in [`crate::schema`].
//!
//! # Usage
//!
//! ```ignore
//! use tiledport::parser::parse_markup;
//!
//! let source = std::fs::read_to_string("levels/cave.tmx")?;
//! let root = parse_markup(&source)?;
//!
//! for child in &root.children {
//!     println!("<{}>", child.name);
//! }
//! ```

mod element;
pub mod reader;
pub mod span;

pub use element::{parse_markup, parse_markup_file, Element, TreeBuilder};
pub use reader::{MarkupEvent, MarkupReader};
pub use span::Location;
