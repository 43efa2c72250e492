//! Carve CLI - split a CMake build graph into per-shared-library Cargo crates

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use carve::util::diagnostic;
use carve::GraphError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<GraphError>() {
            Some(graph_err) => diagnostic::emit(&graph_err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("carve=debug")
    } else {
        EnvFilter::new("carve=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Filter(args) => commands::filter::execute(args),
        Commands::Partition(args) => commands::partition::execute(args, color),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::LinkArgs(args) => commands::link_args::execute(args),
        Commands::Query(args) => commands::query::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
