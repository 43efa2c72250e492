//! `carve link-args` command

use anyhow::Result;

use crate::cli::LinkArgsArgs;
use crate::commands::{absolute, load_config};
use carve::ops::{add_link_args, BuildTree};

pub fn execute(args: LinkArgsArgs) -> Result<()> {
    let config = load_config()?;
    let tree = BuildTree::new(absolute(args.build_root)?, config);

    let count = add_link_args(&tree, &args.build_script)?;

    if count == 0 {
        eprintln!("{:>12} no system libraries to link", "Skipped");
    } else {
        eprintln!(
            "{:>12} {} link arguments to `{}`",
            "Added",
            count,
            args.build_script.display()
        );
    }

    Ok(())
}
