//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Carve - split a CMake build graph into per-shared-library Cargo crates
#[derive(Parser)]
#[command(name = "carve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Keep only the compile commands linked into the executable
    Filter(FilterArgs),

    /// Generate one crate per shared library and wire up the workspace
    Partition(PartitionArgs),

    /// Show the partitions without writing anything
    Plan(PlanArgs),

    /// Forward system libraries to rustc from a build script
    LinkArgs(LinkArgsArgs),

    /// Print a field of the executable's target descriptor
    Query(QueryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct FilterArgs {
    /// Configured CMake build directory
    pub build_root: PathBuf,

    /// Source directory target sources are relative to
    pub source_root: PathBuf,

    /// compile_commands.json to filter in place
    pub command_file: PathBuf,
}

#[derive(Args)]
pub struct PartitionArgs {
    /// Configured CMake build directory
    pub build_root: PathBuf,

    /// Source directory target sources are relative to
    pub source_root: PathBuf,

    /// Root of the Rust project to rewrite
    pub rust_root: PathBuf,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Configured CMake build directory
    pub build_root: PathBuf,

    /// Source directory target sources are relative to
    pub source_root: PathBuf,
}

#[derive(Args)]
pub struct LinkArgsArgs {
    /// Configured CMake build directory
    pub build_root: PathBuf,

    /// build.rs to insert the link statements into
    pub build_script: PathBuf,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Configured CMake build directory
    pub build_root: PathBuf,

    /// Top-level descriptor field, e.g. `name` or `artifacts`
    pub key: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_link_args_subcommand_name() {
        let cli = Cli::try_parse_from(["carve", "link-args", "build", "build.rs"]).unwrap();
        assert!(matches!(cli.command, Commands::LinkArgs(_)));
    }
}
