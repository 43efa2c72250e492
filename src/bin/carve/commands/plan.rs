//! `carve plan` command
//!
//! Prints the partitions `carve partition` would generate crates for.

use std::path::Path;

use anyhow::Result;

use crate::cli::PlanArgs;
use crate::commands::{absolute, load_config};
use carve::core::reach::Partition;
use carve::ops::partition::unit_name;
use carve::ops::{plan, BuildTree};
use carve::util::config::ClassifyConfig;
use carve::util::fs::relative_path;

pub fn execute(args: PlanArgs) -> Result<()> {
    let config = load_config()?;
    let build_root = absolute(args.build_root)?;
    let tree = BuildTree::new(&build_root, config).with_source_root(absolute(args.source_root)?);

    let plan = plan(&tree)?;
    if plan.executable.is_none() {
        println!("no executable target: the top-level crate becomes a cdylib");
        return Ok(());
    }

    let classify = &tree.config().classify;
    for (index, partition) in plan.partitions.iter().enumerate() {
        let artifact = relative_path(&build_root, &partition.artifact);
        if index == 0 {
            println!("{} (executable)", artifact.display());
        } else if partition.sources.is_empty() {
            println!("{} (skipped, no sources)", artifact.display());
        } else {
            let name = unit_name(&partition.artifact, classify);
            println!(
                "{} -> {}/{}",
                artifact.display(),
                tree.config().layout.units_dir,
                name
            );
        }
        print_partition(partition, &build_root, classify);
    }

    Ok(())
}

fn print_partition(partition: &Partition, build_root: &Path, classify: &ClassifyConfig) {
    println!("    {} sources", partition.sources.len());
    for lib in &partition.libs {
        println!(
            "    links {} ({})",
            relative_path(build_root, lib).display(),
            unit_name(lib, classify)
        );
    }
}
