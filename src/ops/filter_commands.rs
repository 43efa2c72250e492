//! Implementation of `carve filter`.
//!
//! Reduces a `compile_commands.json` to the translation units that are
//! actually linked into the executable.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::error::{ConfigError, GraphError, ParseError};
use crate::core::reach::Traversal;
use crate::ops::BuildTree;
use crate::util::fs;

/// What a filter run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Records before filtering
    pub total: usize,
    /// Records kept
    pub kept: usize,
}

/// Keep only the records whose `file` is in `reachable`, in input order.
///
/// `path` names the document the records came from, for error messages.
pub fn filter_records(
    records: Vec<Value>,
    reachable: &BTreeSet<PathBuf>,
    path: &Path,
) -> Result<Vec<Value>, GraphError> {
    let mut kept = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let file = record_file(&record).ok_or_else(|| ParseError::MissingFile {
            path: path.to_path_buf(),
            index,
        })?;
        if reachable.contains(&file) {
            kept.push(record);
        } else {
            tracing::debug!("dropping compile command for {}", file.display());
        }
    }
    Ok(kept)
}

/// The normalized source path a record compiles.
fn record_file(record: &Value) -> Option<PathBuf> {
    let file = Path::new(record.get("file")?.as_str()?);
    let file = match record.get("directory").and_then(Value::as_str) {
        Some(dir) if file.is_relative() => Path::new(dir).join(file),
        _ => file.to_path_buf(),
    };
    Some(fs::normalize_lexical(&file))
}

/// Filter the command file at `command_file` in place.
pub fn filter_commands(tree: &BuildTree, command_file: &Path) -> Result<FilterResult> {
    let graph = tree.graph()?;
    let executable = graph.executable().ok_or(GraphError::from(ConfigError::NoExecutable))?;
    let classifier = tree.classifier();

    let reachable: BTreeSet<PathBuf> = Traversal::new(&graph, &classifier)
        .reachable_sources(executable)?
        .iter()
        .map(|p| fs::normalize_lexical(p))
        .collect();
    tracing::info!(
        "{} sources reachable from {}",
        reachable.len(),
        executable.display()
    );

    let content = fs::read_to_string(command_file)?;
    let records: Vec<Value> = serde_json::from_str(&content)
        .map_err(|e| GraphError::json(command_file, e))?;
    let total = records.len();

    let kept = filter_records(records, &reachable, command_file)?;
    let result = FilterResult {
        total,
        kept: kept.len(),
    };

    let json = serde_json::to_string_pretty(&kept)
        .with_context(|| "failed to serialize compile commands")?;
    fs::write_string(command_file, &json)?;

    Ok(result)
}
