//! High-level operations.
//!
//! This module contains the implementation of carve commands.

pub mod filter_commands;
pub mod link_args;
pub mod partition;
pub mod query;

use std::path::{Path, PathBuf};

use crate::core::codemodel::CodeModel;
use crate::core::error::GraphResult;
use crate::core::graph::DependencyGraph;
use crate::core::reach::Classifier;
use crate::util::Config;

pub use filter_commands::{filter_commands, filter_records, FilterResult};
pub use link_args::{add_link_args, insert_link_args};
pub use partition::{partition, plan, PartitionPlan, PartitionResult, Unit};
pub use query::query_field;

/// A configured CMake build tree and how to read it.
#[derive(Debug, Clone)]
pub struct BuildTree {
    build_root: PathBuf,
    source_root: Option<PathBuf>,
    config: Config,
}

impl BuildTree {
    /// Create a handle on the build tree at `build_root`.
    pub fn new(build_root: impl Into<PathBuf>, config: Config) -> Self {
        BuildTree {
            build_root: build_root.into(),
            source_root: None,
            config,
        }
    }

    /// Set the directory target source paths are relative to.
    ///
    /// Without one, sources resolve against the build root, which is enough
    /// for operations that only look at link fragments.
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    /// The build root.
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// The source root, falling back to the build root.
    pub fn source_root(&self) -> &Path {
        self.source_root.as_deref().unwrap_or(&self.build_root)
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the file-API code model.
    pub fn model(&self) -> GraphResult<CodeModel> {
        CodeModel::load(&self.build_root, &self.config.layout.reply_dir)
    }

    /// Load and resolve the dependency graph.
    pub fn graph(&self) -> GraphResult<DependencyGraph> {
        let model = self.model()?;
        let graph = DependencyGraph::resolve(&model.targets, &self.build_root, self.source_root())?;
        if graph.is_empty() {
            tracing::warn!("no target in {} has an artifact", self.build_root.display());
        }
        Ok(graph)
    }

    /// Path classifier from configuration.
    pub fn classifier(&self) -> Classifier {
        Classifier::from_config(&self.config.classify)
    }
}
