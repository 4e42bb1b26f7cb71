//! Source positions for markup diagnostics.

use std::fmt;

/// A position in markup text (byte offset, line, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Byte offset from start of file
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed, in characters not bytes)
    pub column: u32,
}

impl Location {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self { offset, line, column }
    }

    /// Locate a byte offset within `source`.
    pub fn in_source(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        // Offsets reported by the reader can land inside a multi-byte char.
        let mut boundary = offset;
        while !source.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let before = &source[..boundary];

        let line = before.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() as u32 + 1;

        Self { offset, line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_in_source() {
        let source = "<map>\n  <layer/>\n</map>";

        assert_eq!(Location::in_source(source, 0), Location::new(0, 1, 1));
        assert_eq!(Location::in_source(source, 6), Location::new(6, 2, 1));
        assert_eq!(Location::in_source(source, 8), Location::new(8, 2, 3));
    }

    #[test]
    fn test_location_clamps_past_end() {
        let source = "<a/>";
        assert_eq!(Location::in_source(source, 99), Location::new(4, 1, 5));
    }

    #[test]
    fn test_location_inside_multibyte_char() {
        let source = "é<a/>";
        let loc = Location::in_source(source, 1);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 1);
    }
}
