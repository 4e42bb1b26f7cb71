//! Core value types shared by the decoder, assembler and atlas importer.
//!
//! - `Colour` - editor colours (`#RRGGBB` / `#AARRGGBB`)
//! - `Gid` - packed cell values with flip flags

mod colour;
pub mod gid;

pub use colour::Colour;
pub use gid::Gid;
