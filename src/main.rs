use clap::Parser;
use miette::Result;
use tiledport::cli::{Cli, Commands};
use tiledport::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Import(args) => tiledport::cli::import::run(args, &printer)?,
        Commands::Build(args) => tiledport::cli::build::run(args, &printer)?,
        Commands::Validate(args) => tiledport::cli::validate::run(args, &printer)?,
        Commands::Completions(args) => tiledport::cli::completions::run(args)?,
    }

    Ok(())
}
