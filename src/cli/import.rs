//! Import command implementation.
//!
//! Imports a single map, tileset or world file.

use std::path::PathBuf;

use clap::Args;

use crate::error::{ImportError, Result};
use crate::host::FileHost;
use crate::import::{ImportContext, ImportOptions};
use crate::output::{display_path, plural, Printer};

/// Import one map, tileset or world
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Map (.tmx), tileset (.tsx) or world (.world) file
    pub source: PathBuf,

    /// Scene file to write (.json, .scene, .yaml, .yml), or the tileset
    /// resource for tileset imports
    #[arg(long, short)]
    pub output: PathBuf,

    /// Import option as KEY=VALUE (repeatable)
    #[arg(long = "option", short = 'O', value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Tileset resource that receives atlases
    #[arg(long)]
    pub tileset_resource: Option<PathBuf>,

    /// Directory for world minimap files
    #[arg(long)]
    pub map_data_output: Option<PathBuf>,

    /// Directory for per-room scenes of a world
    #[arg(long)]
    pub target_directory: Option<PathBuf>,

    /// Rebuild atlases that were already imported
    #[arg(long)]
    pub overwrite_atlas: bool,

    /// Print each import step
    #[arg(long, short)]
    pub verbose: bool,
}

pub fn run(args: ImportArgs, printer: &Printer) -> Result<()> {
    let options = options_from_args(&args)?;
    let report = ImportContext::new(&FileHost, &options)
        .with_printer(printer)
        .import(&args.source, &args.output)?;

    printer.success(
        "Finished",
        &format!(
            "{} {} ({})",
            report.kind.label(),
            display_path(&args.source),
            plural(report.written.len(), "file written", "files written")
        ),
    );
    Ok(())
}

/// `-O` pairs first, then the dedicated flags on top.
fn options_from_args(args: &ImportArgs) -> Result<ImportOptions> {
    let mut options = ImportOptions::default();
    for pair in &args.options {
        let (key, value) = pair.split_once('=').ok_or_else(|| ImportError::InvalidOption {
            name: pair.clone(),
            message: "expected KEY=VALUE".to_string(),
        })?;
        options.set(key.trim(), value)?;
    }

    if args.tileset_resource.is_some() {
        options.tileset_resource = args.tileset_resource.clone();
    }
    if args.map_data_output.is_some() {
        options.map_data_output = args.map_data_output.clone();
    }
    if args.target_directory.is_some() {
        options.target_directory = args.target_directory.clone();
    }
    options.overrides_existing_atlas |= args.overwrite_atlas;
    options.verbose |= args.verbose;
    Ok(options)
}
