//! Terminal output for the tiledport CLI.
//!
//! Status lines follow Cargo: a right-aligned coloured verb, then the message.
//! Everything goes to stderr so stdout stays free for completion scripts.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::{Diagnostic, Severity};

/// Width of the right-aligned verb column.
const VERB_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Green,
    Cyan,
    Yellow,
    Red,
    Dim,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Green => "\x1b[1;32m",
            Tone::Cyan => "\x1b[1;36m",
            Tone::Yellow => "\x1b[1;33m",
            Tone::Red => "\x1b[1;31m",
            Tone::Dim => "\x1b[2m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Status printer for import progress and diagnostics.
///
/// Colour is on when stderr is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn is_colored(&self) -> bool {
        self.color
    }

    /// e.g. "   Importing map levels/caves.tmx"
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    /// Verbose progress lines.
    pub fn info(&self, verb: &str, message: &str) {
        self.line(Tone::Cyan, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Yellow, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(Tone::Red, verb, message);
    }

    /// Print one diagnostic found in `file`.
    pub fn diagnostic(&self, file: &str, diagnostic: &Diagnostic) {
        let _ = write!(io::stderr().lock(), "{}", self.render_diagnostic(file, diagnostic));
    }

    /// A diagnostic as printed, one line plus an optional help line:
    ///
    /// ```text
    ///   warning[tiledport::validate::unsorted-firstgid]: cave.tmx: ... (levels/cave.tmx)
    ///     help: ...
    /// ```
    pub fn render_diagnostic(&self, file: &str, diagnostic: &Diagnostic) -> String {
        let tone = match diagnostic.severity {
            Severity::Error => Tone::Red,
            Severity::Warning => Tone::Yellow,
        };
        let subject = diagnostic
            .subject
            .as_deref()
            .map(|s| format!("{}: ", s))
            .unwrap_or_default();

        let mut out = format!(
            "  {}[{}]: {}{}{}\n",
            self.paint(tone, &diagnostic.severity.to_string()),
            diagnostic.code,
            subject,
            diagnostic.message,
            self.paint(Tone::Dim, &format!(" ({})", file)),
        );
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!("    {}: {}\n", self.paint(Tone::Cyan, "help"), help));
        }
        out
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if self.color {
            format!("{}{}{}", tone.code(), text, RESET)
        } else {
            text.to_string()
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        let verb = format!("{verb:>VERB_WIDTH$}");
        let _ = writeln!(io::stderr().lock(), "{} {}", self.paint(tone, &verb), message);
    }
}

/// Pluralize a count: `plural(1, "map", "maps")` → "1 map".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Path relative to the working directory when it lies inside it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(r) if r.as_os_str().is_empty() => ".".to_string(),
        Some(r) => r.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "map", "maps"), "1 map");
        assert_eq!(plural(0, "map", "maps"), "0 maps");
        assert_eq!(plural(5, "tileset", "tilesets"), "5 tilesets");
    }

    #[test]
    fn test_render_plain_diagnostic() {
        let printer = Printer::plain();
        assert!(!printer.is_colored());

        let diagnostic = Diagnostic::warning(
            "tiledport::validate::unsorted-firstgid",
            "tilesets are not in firstgid order",
        )
        .with_subject("cave.tmx")
        .with_help("Reorder the tilesets in the editor");

        assert_eq!(
            printer.render_diagnostic("levels/cave.tmx", &diagnostic),
            "  warning[tiledport::validate::unsorted-firstgid]: cave.tmx: \
             tilesets are not in firstgid order (levels/cave.tmx)\n    \
             help: Reorder the tilesets in the editor\n"
        );
    }

    #[test]
    fn test_coloured_diagnostic_paints_severity() {
        let printer = Printer { color: true };
        let rendered = printer.render_diagnostic("walls.tsx", &Diagnostic::error("x", "broken"));
        assert!(rendered.starts_with("  \x1b[1;31merror\x1b[0m[x]: broken"));
    }

    #[test]
    fn test_display_path_outside_cwd() {
        let p = Path::new("/nonexistent/path/to/file");
        assert_eq!(display_path(p), "/nonexistent/path/to/file");
    }
}
