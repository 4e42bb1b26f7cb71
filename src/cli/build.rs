//! Build command implementation.
//!
//! Imports every tileset, map and world in a project, in that order, and
//! stops at the first failure.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::discover;
use crate::error::{ImportError, Result};
use crate::host::FileHost;
use crate::import::ImportContext;
use crate::output::{display_path, plural, Printer};
use crate::validation::print_diagnostics;

use super::validate::validate_file;

/// Import every editor file in a project
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Output directory (overrides tiledport.yaml)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Scene file extension: json, scene, yaml or yml
    #[arg(long)]
    pub format: Option<String>,

    /// Validate each file before importing it
    #[arg(long)]
    pub validate: bool,

    /// Rebuild atlases that were already imported
    #[arg(long)]
    pub overwrite_atlas: bool,

    /// Print each import step
    #[arg(long, short)]
    pub verbose: bool,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let mut project = discover(&args.dir)?;
    if let Some(output) = args.output {
        project.manifest.output = output;
    }
    if let Some(format) = args.format {
        project.manifest.format = format;
    }
    project.manifest.options.overrides_existing_atlas |= args.overwrite_atlas;
    project.manifest.options.verbose |= args.verbose;

    if project.scan.is_empty() {
        printer.warning(
            "Warning",
            &format!("no .tmx, .tsx or .world files in {}", display_path(&project.root)),
        );
        return Ok(());
    }

    let options = project.options();
    let context = ImportContext::new(&FileHost, &options).with_printer(printer);
    let jobs = project.jobs();
    let mut written = 0;

    for job in &jobs {
        if args.validate {
            let result = validate_file(&FileHost, &job.source)?;
            print_diagnostics(printer, &display_path(&job.source), &result);
            if result.has_errors() {
                return Err(ImportError::Validation {
                    message: format!(
                        "{} has {}",
                        display_path(&job.source),
                        plural(result.error_count(), "error", "errors")
                    ),
                    help: Some("Run `tiledport validate` for details".to_string()),
                });
            }
        }

        printer.status(
            "Importing",
            &format!("{} {}", job.kind.label(), display_path(&job.source)),
        );
        let report = context.import(&job.source, &job.save_path)?;
        written += report.written.len();
    }

    printer.success(
        "Finished",
        &format!(
            "{} imported, {} written to {}",
            plural(jobs.len(), "file", "files"),
            plural(written, "file", "files"),
            display_path(&project.output_dir())
        ),
    );
    Ok(())
}
