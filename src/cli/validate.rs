//! Validate command implementation.
//!
//! Decodes maps, tilesets and worlds and reports every problem found,
//! without writing anything.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::discover_paths;
use crate::error::{ImportError, Result};
use crate::host::{FileHost, ResourceHost};
use crate::import::SourceKind;
use crate::output::{display_path, plural, Printer};
use crate::schema::{decode_str, TileMap, TileSet, World};
use crate::validation::{print_diagnostics, validate_map, validate_tileset, Diagnostic, ValidationResult};

/// Check maps and tilesets without writing anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to check (default: current directory)
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let paths = if args.files.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.files
    };
    let project = discover_paths(&paths);

    let mut errors = 0;
    let mut warnings = 0;
    let mut checked = 0;
    for kind in [SourceKind::Tileset, SourceKind::Map, SourceKind::World] {
        for file in project.scan.files_of_kind(kind) {
            let result = validate_file(&FileHost, file)?;
            print_diagnostics(printer, &display_path(file), &result);
            errors += result.error_count();
            warnings += result.warning_count();
            checked += 1;
        }
    }

    let summary = format!(
        "{} ({}, {})",
        plural(checked, "file", "files"),
        plural(errors, "error", "errors"),
        plural(warnings, "warning", "warnings")
    );
    if errors > 0 || (args.strict && warnings > 0) {
        printer.error("Failed", &summary);
        return Err(ImportError::Validation {
            message: format!("validation failed: {}", summary),
            help: Some("Fix the reported problems and run validate again".to_string()),
        });
    }
    printer.success("Checked", &summary);
    Ok(())
}

/// Decode one file and run the checks for its kind.
///
/// Files that cannot be decoded at all fail with their import error.
pub fn validate_file(host: &dyn ResourceHost, path: &Path) -> Result<ValidationResult> {
    let text = host.read_to_string(path)?;
    match SourceKind::from_path(path)? {
        SourceKind::Map => {
            let map: TileMap = decode_str(&text)?;
            Ok(validate_map(&map))
        }
        SourceKind::Tileset => {
            let tileset: TileSet = decode_str(&text)?;
            Ok(validate_tileset(&tileset))
        }
        SourceKind::World => {
            let world = World::from_json(&text)?;
            let mut result = ValidationResult::new();
            for map in world.map_paths(path) {
                if !host.exists(&map) {
                    result.push(
                        Diagnostic::error(
                            "tiledport::validate::missing-map",
                            format!("{} does not exist", display_path(&map)),
                        )
                        .with_subject(display_path(path)),
                    );
                }
            }
            Ok(result)
        }
    }
}
