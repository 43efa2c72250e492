//! Loader for the CMake file-API reply.
//!
//! The reply directory holds one `index-*.json` that points at a
//! `codemodel-v2` document, which in turn lists one descriptor file per
//! target. Every document is parsed eagerly and any failure is fatal.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::error::{ConfigError, GraphError, GraphResult};
use crate::core::target::{LinkFragment, Target, TargetKind};
use crate::util::fs::glob_in;

/// File name pattern of the reply index.
pub const INDEX_PATTERN: &str = "index-*.json";

#[derive(Debug, Deserialize)]
struct Index {
    reply: IndexReply,
}

#[derive(Debug, Deserialize)]
struct IndexReply {
    #[serde(rename = "codemodel-v2")]
    codemodel: ReplyFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyFile {
    json_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Codemodel {
    configurations: Vec<Configuration>,
}

#[derive(Debug, Deserialize)]
struct Configuration {
    #[serde(default)]
    name: String,
    targets: Vec<TargetRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetRef {
    #[serde(default)]
    name: String,
    json_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct TargetDescriptor {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    artifacts: Vec<PathEntry>,
    #[serde(default)]
    sources: Vec<PathEntry>,
    #[serde(default)]
    link: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct PathEntry {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Link {
    #[serde(default)]
    command_fragments: Vec<LinkFragment>,
}

/// The targets of configuration 0 of a configured build tree.
#[derive(Debug, Clone)]
pub struct CodeModel {
    /// Reply directory the documents were read from
    pub reply_dir: PathBuf,

    /// Name of the configuration (empty for single-config generators)
    pub configuration: String,

    /// Targets in codemodel order
    pub targets: Vec<Target>,
}

impl CodeModel {
    /// Load the code model from `<build_root>/<reply_dir>`.
    pub fn load(build_root: &Path, reply_dir: &Path) -> GraphResult<Self> {
        let reply_dir = build_root.join(reply_dir);
        let index_path = find_index(&reply_dir)?;
        tracing::debug!("reading file-API index {}", index_path.display());

        let index: Index = read_json(&index_path)?;
        let codemodel_path = reply_dir.join(&index.reply.codemodel.json_file);
        let codemodel: Codemodel = read_json(&codemodel_path)?;

        // Configuration 0 is authoritative; multi-config generators list the
        // others after it.
        let configuration = codemodel
            .configurations
            .into_iter()
            .next()
            .ok_or_else(|| ConfigError::NoConfigurations {
                path: codemodel_path.clone(),
            })?;

        let mut targets = Vec::with_capacity(configuration.targets.len());
        for target_ref in &configuration.targets {
            let descriptor_path = reply_dir.join(&target_ref.json_file);
            tracing::debug!(
                "reading target `{}` from {}",
                target_ref.name,
                descriptor_path.display()
            );
            targets.push(read_target(&descriptor_path)?);
        }

        tracing::info!(
            "loaded {} targets from {}",
            targets.len(),
            reply_dir.display()
        );

        Ok(CodeModel {
            reply_dir,
            configuration: configuration.name,
            targets,
        })
    }

    /// Find the executable target, if there is one.
    pub fn executable(&self) -> Option<&Target> {
        self.targets.iter().find(|t| t.is_executable())
    }
}

/// Locate the single index document in a reply directory.
fn find_index(reply_dir: &Path) -> GraphResult<PathBuf> {
    if !reply_dir.is_dir() {
        return Err(ConfigError::NoIndex {
            reply_dir: reply_dir.to_path_buf(),
        }
        .into());
    }

    let mut found = glob_in(reply_dir, INDEX_PATTERN).map_err(|e| GraphError::io(reply_dir, e))?;

    match found.len() {
        0 => Err(ConfigError::NoIndex {
            reply_dir: reply_dir.to_path_buf(),
        }
        .into()),
        1 => Ok(found.remove(0)),
        _ => Err(ConfigError::MultipleIndexes {
            reply_dir: reply_dir.to_path_buf(),
            found,
        }
        .into()),
    }
}

/// Read and deserialize a JSON document, tagging failures with its path.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> GraphResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| GraphError::json(path, e))
}

/// Parse one target descriptor, keeping the raw document alongside.
fn read_target(path: &Path) -> GraphResult<Target> {
    let descriptor: serde_json::Value = read_json(path)?;
    let parsed = TargetDescriptor::deserialize(&descriptor).map_err(|e| GraphError::json(path, e))?;

    Ok(Target {
        name: parsed.name,
        kind: TargetKind::from_cmake(&parsed.kind),
        artifacts: parsed.artifacts.into_iter().map(|a| a.path).collect(),
        sources: parsed.sources.into_iter().map(|s| s.path).collect(),
        link_fragments: parsed
            .link
            .map(|link| link.command_fragments)
            .unwrap_or_default(),
        descriptor_path: path.to_path_buf(),
        descriptor,
    })
}
