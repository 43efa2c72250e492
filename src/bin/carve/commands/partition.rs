//! `carve partition` command

use anyhow::Result;

use crate::cli::PartitionArgs;
use crate::commands::{absolute, load_config};
use carve::core::MANIFEST_NAME;
use carve::ops::{partition, BuildTree, PartitionResult};
use carve::util::diagnostic::{self, suggestions, Diagnostic};

pub fn execute(args: PartitionArgs, color: bool) -> Result<()> {
    let config = load_config()?;
    let tree = BuildTree::new(absolute(args.build_root)?, config)
        .with_source_root(absolute(args.source_root)?);
    let rust_root = absolute(args.rust_root)?;

    let result = match partition(&tree, &rust_root) {
        Ok(result) => result,
        Err(e) => {
            let note = Diagnostic::note("the Rust project may be partially rewritten")
                .with_location(&rust_root)
                .with_suggestion(suggestions::STALE_OUTPUT);
            diagnostic::emit(&note, color);
            return Err(e);
        }
    };

    match result {
        PartitionResult::LibraryOnly { manifest } => {
            eprintln!(
                "{:>12} `{}` as a cdylib (no executable target)",
                "Updated",
                manifest.display()
            );
        }
        PartitionResult::Workspace { units, skipped } => {
            for artifact in &skipped {
                let warning = Diagnostic::warning(format!(
                    "`{}` owns no sources; no crate generated",
                    artifact.display()
                ));
                diagnostic::emit(&warning, color);
            }
            for unit in &units {
                eprintln!(
                    "{:>12} crate `{}` at {} ({} sources)",
                    "Created", unit.name, unit.member, unit.sources
                );
            }
            eprintln!(
                "{:>12} `{}` with {} workspace members",
                "Updated",
                rust_root.join(MANIFEST_NAME).display(),
                units.len()
            );
        }
    }

    Ok(())
}
