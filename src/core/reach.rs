//! Worklist reachability over the dependency graph.
//!
//! One walk serves both consumers. In [`Mode::Flat`] dynamic libraries are
//! expanded like any other artifact, giving every source linked into the
//! root. In [`Mode::Partition`] they are collected as boundaries instead, and
//! [`Traversal::partitions`] restarts a fresh walk at each boundary.
//!
//! Both loops use explicit stacks; emission order is not part of the contract.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::core::error::GraphResult;
use crate::core::graph::DependencyGraph;
use crate::util::config::ClassifyConfig;

/// What a dependency path is, judged by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// A compiled translation unit; always a leaf
    Source,
    /// A shared library artifact
    DynamicLibrary,
    /// Any other artifact: static archive, object file, executable
    Intermediate,
}

/// Suffix-based node classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    source_extensions: Vec<String>,
    dylib_extension: String,
}

impl Classifier {
    /// Create a classifier from explicit extensions (without the dot).
    pub fn new(
        source_extensions: impl IntoIterator<Item = impl Into<String>>,
        dylib_extension: impl Into<String>,
    ) -> Self {
        Classifier {
            source_extensions: source_extensions.into_iter().map(Into::into).collect(),
            dylib_extension: dylib_extension.into(),
        }
    }

    /// Create a classifier from configuration.
    pub fn from_config(config: &ClassifyConfig) -> Self {
        Classifier::new(
            config.source_extensions.iter().cloned(),
            config.dylib_extension.clone(),
        )
    }

    /// Classify a dependency path.
    pub fn classify(&self, path: &Path) -> NodeClass {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if self.source_extensions.iter().any(|s| s == ext) => NodeClass::Source,
            Some(ext) if ext == self.dylib_extension => NodeClass::DynamicLibrary,
            _ => NodeClass::Intermediate,
        }
    }

    /// Check if `path` is a shared library artifact.
    pub fn is_dylib(&self, path: &Path) -> bool {
        self.classify(path) == NodeClass::DynamicLibrary
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::from_config(&ClassifyConfig::default())
    }
}

/// How dynamic libraries are treated during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Expand dynamic libraries in place
    Flat,
    /// Stop at dynamic libraries and report them as boundaries
    Partition,
}

/// Result of one walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reach {
    /// Sources reachable from the root
    pub sources: BTreeSet<PathBuf>,
    /// Dynamic libraries the walk stopped at (always empty in flat mode)
    pub boundaries: BTreeSet<PathBuf>,
}

/// One partition: a root artifact and what it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// The shared library, or the executable for the residual partition
    pub artifact: PathBuf,
    /// Sources reachable without crossing another dynamic library
    pub sources: BTreeSet<PathBuf>,
    /// Dynamic libraries directly below this one
    pub libs: BTreeSet<PathBuf>,
}

/// Traversal over a graph with a fixed classifier.
#[derive(Debug, Clone, Copy)]
pub struct Traversal<'g> {
    graph: &'g DependencyGraph,
    classifier: &'g Classifier,
}

impl<'g> Traversal<'g> {
    /// Create a traversal over `graph`.
    pub fn new(graph: &'g DependencyGraph, classifier: &'g Classifier) -> Self {
        Traversal { graph, classifier }
    }

    /// Walk everything below `root`.
    ///
    /// The root is always expanded, even when it is itself a dynamic library.
    /// Each artifact is expanded at most once per walk, which makes cycles and
    /// diamonds safe.
    pub fn walk(&self, root: &Path, mode: Mode) -> GraphResult<Reach> {
        let mut reach = Reach::default();
        let mut visited: HashSet<&Path> = HashSet::new();
        // (dependency, artifact that listed it)
        let mut worklist: Vec<(&Path, &Path)> = Vec::new();

        visited.insert(root);
        let root_deps = self.graph.deps(root, root)?;
        worklist.extend(root_deps.iter().map(|d| (d.as_path(), root)));

        while let Some((path, dependent)) = worklist.pop() {
            let class = self.classifier.classify(path);
            if class == NodeClass::Source {
                reach.sources.insert(path.to_path_buf());
                continue;
            }
            if visited.contains(path) {
                continue;
            }
            if class == NodeClass::DynamicLibrary && mode == Mode::Partition {
                reach.boundaries.insert(path.to_path_buf());
                continue;
            }

            visited.insert(path);
            let deps = self.graph.deps(path, dependent)?;
            worklist.extend(deps.iter().map(|d| (d.as_path(), path)));
        }

        Ok(reach)
    }

    /// Every source linked into `root`, across dynamic library boundaries.
    pub fn reachable_sources(&self, root: &Path) -> GraphResult<BTreeSet<PathBuf>> {
        self.walk(root, Mode::Flat).map(|reach| reach.sources)
    }

    /// Split everything below `root` at dynamic library boundaries.
    ///
    /// The first partition is always `root`'s own. The rest follow in
    /// discovery order, one per distinct dynamic library, including libraries
    /// only reachable through other libraries.
    pub fn partitions(&self, root: &Path) -> GraphResult<Vec<Partition>> {
        let mut partitions = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut worklist = vec![root.to_path_buf()];

        while let Some(artifact) = worklist.pop() {
            if !seen.insert(artifact.clone()) {
                continue;
            }

            let reach = self.walk(&artifact, Mode::Partition)?;
            tracing::debug!(
                "partition {}: {} sources, {} libraries",
                artifact.display(),
                reach.sources.len(),
                reach.boundaries.len()
            );

            worklist.extend(reach.boundaries.iter().rev().cloned());
            partitions.push(Partition {
                artifact,
                sources: reach.sources,
                libs: reach.boundaries,
            });
        }

        Ok(partitions)
    }
}
