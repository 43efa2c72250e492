//! `carve query` command

use anyhow::Result;

use crate::cli::QueryArgs;
use crate::commands::{absolute, load_config};
use carve::ops::{query_field, BuildTree};

pub fn execute(args: QueryArgs) -> Result<()> {
    let config = load_config()?;
    let tree = BuildTree::new(absolute(args.build_root)?, config);

    println!("{}", query_field(&tree, &args.key)?);

    Ok(())
}
