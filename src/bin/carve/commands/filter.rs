//! `carve filter` command

use anyhow::Result;

use crate::cli::FilterArgs;
use crate::commands::{absolute, load_config};
use carve::ops::{filter_commands, BuildTree};

pub fn execute(args: FilterArgs) -> Result<()> {
    let config = load_config()?;
    let tree = BuildTree::new(absolute(args.build_root)?, config)
        .with_source_root(absolute(args.source_root)?);

    let result = filter_commands(&tree, &args.command_file)?;

    eprintln!(
        "{:>12} {} of {} compile commands",
        "Filtered", result.kept, result.total
    );

    Ok(())
}
