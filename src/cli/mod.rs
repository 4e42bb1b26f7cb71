pub mod build;
pub mod completions;
pub mod import;
pub mod validate;

use clap::{Parser, Subcommand};

/// tiledport - Tile-map editor importer
#[derive(Parser, Debug)]
#[command(name = "tiledport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import one map, tileset or world
    Import(import::ImportArgs),

    /// Import every editor file in a project
    Build(build::BuildArgs),

    /// Check maps and tilesets without writing anything
    Validate(validate::ValidateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
