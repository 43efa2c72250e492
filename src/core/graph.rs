//! Artifact-level dependency graph resolved from the targets.
//!
//! Every node is an artifact path. Its dependency list is the target's
//! link-time archives and dynamic libraries (build-root relative) followed by
//! its sources (source-root relative), in descriptor order.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::core::error::{GraphResult, StructureError};
use crate::core::target::{LibraryFragment, Target, TargetKind};

/// Map from artifact path to its immediate dependencies.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    deps: HashMap<PathBuf, Vec<PathBuf>>,
    executable: Option<PathBuf>,
    system_libs: BTreeSet<String>,
}

impl DependencyGraph {
    /// Resolve the graph for a set of targets.
    pub fn resolve(targets: &[Target], build_root: &Path, source_root: &Path) -> GraphResult<Self> {
        let mut graph = DependencyGraph::default();

        for target in targets {
            let mut link_deps = Vec::new();
            for fragment in &target.link_fragments {
                match fragment.library() {
                    Some(LibraryFragment::SystemLibrary(flag)) => {
                        graph.system_libs.insert(flag.to_string());
                    }
                    Some(LibraryFragment::Path(path)) => link_deps.push(build_root.join(path)),
                    Some(LibraryFragment::Flag(flag)) => {
                        tracing::debug!("ignoring link flag `{}` of `{}`", flag, target.name);
                    }
                    None => {}
                }
            }

            match target.kind {
                TargetKind::ObjectLibrary => {
                    graph.add_object_library(target, link_deps, build_root, source_root)?
                }
                _ => graph.add_target(target, link_deps, build_root, source_root)?,
            }
        }

        tracing::debug!(
            "resolved {} artifacts, {} system libraries",
            graph.deps.len(),
            graph.system_libs.len()
        );

        Ok(graph)
    }

    /// One artifact per source, paired positionally.
    fn add_object_library(
        &mut self,
        target: &Target,
        link_deps: Vec<PathBuf>,
        build_root: &Path,
        source_root: &Path,
    ) -> GraphResult<()> {
        if target.artifacts.len() != target.sources.len() {
            return Err(StructureError::ArtifactSourceMismatch {
                target: target.name.clone(),
                artifacts: target.artifacts.len(),
                sources: target.sources.len(),
            }
            .into());
        }

        for (artifact, source) in target.artifacts.iter().zip(&target.sources) {
            let mut deps = link_deps.clone();
            deps.push(source_root.join(source));
            self.deps.insert(build_root.join(artifact), deps);
        }
        Ok(())
    }

    fn add_target(
        &mut self,
        target: &Target,
        mut link_deps: Vec<PathBuf>,
        build_root: &Path,
        source_root: &Path,
    ) -> GraphResult<()> {
        let artifact = match target.artifacts.as_slice() {
            [artifact] => build_root.join(artifact),
            [] => {
                if let TargetKind::Other(ref kind) = target.kind {
                    tracing::warn!("skipping {} target `{}` without artifacts", kind, target.name);
                    return Ok(());
                }
                return Err(StructureError::MissingArtifact {
                    target: target.name.clone(),
                }
                .into());
            }
            many => {
                return Err(StructureError::MultipleArtifacts {
                    target: target.name.clone(),
                    count: many.len(),
                }
                .into())
            }
        };

        if target.is_executable() {
            if let Some(first) = &self.executable {
                return Err(StructureError::MultipleExecutables {
                    first: first.clone(),
                    second: artifact,
                }
                .into());
            }
            self.executable = Some(artifact.clone());
        }

        link_deps.extend(target.sources.iter().map(|s| source_root.join(s)));
        self.deps.insert(artifact, link_deps);
        Ok(())
    }

    /// Insert a node directly.
    pub fn insert(&mut self, artifact: impl Into<PathBuf>, deps: Vec<PathBuf>) {
        self.deps.insert(artifact.into(), deps);
    }

    /// Designate the executable root.
    pub fn set_executable(&mut self, artifact: impl Into<PathBuf>) {
        self.executable = Some(artifact.into());
    }

    /// Dependencies of `artifact`, which must be a node of the graph.
    ///
    /// `dependent` names the artifact that led here, for the error message.
    pub fn deps(&self, artifact: &Path, dependent: &Path) -> GraphResult<&[PathBuf]> {
        self.deps.get(artifact).map(Vec::as_slice).ok_or_else(|| {
            StructureError::UnknownArtifact {
                artifact: artifact.to_path_buf(),
                dependent: dependent.to_path_buf(),
            }
            .into()
        })
    }

    /// The designated root, if the build has an executable.
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// Distinct `-l` flags across all targets, sorted.
    pub fn system_libs(&self) -> &BTreeSet<String> {
        &self.system_libs
    }

    /// Number of artifacts in the graph.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Check if the graph has no artifacts.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}
