//! Implementation of `carve query`.

use anyhow::Result;
use serde_json::Value;

use crate::core::error::{ConfigError, GraphError};
use crate::ops::BuildTree;

/// Look up a top-level field of the executable's target descriptor.
///
/// Strings come back unquoted; every other value is compact JSON.
pub fn query_field(tree: &BuildTree, key: &str) -> Result<String> {
    let model = tree.model()?;
    let target = model
        .executable()
        .ok_or(GraphError::from(ConfigError::NoExecutable))?;
    tracing::debug!("reading `{}` from {}", key, target.descriptor_path.display());

    let field = target.field(key).ok_or_else(|| {
        GraphError::from(ConfigError::MissingField {
            target: target.name.clone(),
            field: key.to_string(),
        })
    })?;

    Ok(match field {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
