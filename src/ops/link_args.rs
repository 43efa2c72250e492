//! Implementation of `carve link-args`.
//!
//! Forwards the build's system libraries to rustc by splicing
//! `cargo:rustc-link-arg` statements into a `build.rs`. Running it twice
//! inserts the block twice.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::ops::BuildTree;
use crate::util::fs;

/// The statement emitted for one link flag.
fn link_statement(flag: &str) -> String {
    format!("    println!(\"cargo:rustc-link-arg={}\");\n", flag)
}

/// Insert one statement per flag before line index `line` of `content`.
///
/// Content with `line` lines or fewer gets the block appended. Existing line
/// endings are kept as they are.
pub fn insert_link_args(content: &str, flags: &BTreeSet<String>, line: usize) -> String {
    let block: String = flags.iter().map(|f| link_statement(f)).collect();
    if block.is_empty() {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len() + block.len());
    let mut inserted = false;
    for (index, text) in content.split_inclusive('\n').enumerate() {
        if index == line {
            out.push_str(&block);
            inserted = true;
        }
        out.push_str(text);
    }

    if !inserted {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&block);
    }
    out
}

/// Rewrite `build_script` with the build's system libraries.
///
/// Returns the number of flags written.
pub fn add_link_args(tree: &BuildTree, build_script: &Path) -> Result<usize> {
    let graph = tree.graph()?;
    let flags = graph.system_libs();
    tracing::info!("{} system libraries", flags.len());

    let content = fs::read_to_string(build_script)?;
    let updated = insert_link_args(&content, flags, tree.config().link_args.insert_line);
    if updated != content {
        fs::write_string(build_script, &updated)?;
    }

    Ok(flags.len())
}
