//! Test utilities for carve unit tests.
//!
//! [`ReplyFixture`] writes a CMake file-API reply into a temporary build tree,
//! so loader and ops tests run against real files. [`target`] and
//! [`graph_from`] build the in-memory equivalents directly.
//!
//! # Example
//!
//! ```rust,ignore
//! let reply = ReplyFixture::new()
//!     .executable("app", "app", &["main.c"], &["libcore.a"])
//!     .target("core", "STATIC_LIBRARY", &["libcore.a"], &["core.c"], &[])
//!     .write();
//!
//! let model = CodeModel::load(&reply.build_root(), &reply.reply_dir())?;
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::core::graph::DependencyGraph;
use crate::core::target::{FragmentRole, LinkFragment, Target, TargetKind};

pub use fixtures::*;

/// Reply directory relative to the build root.
pub const REPLY_DIR: &str = ".cmake/api/v1/reply";

/// Configuration name written into the codemodel.
pub const CONFIGURATION: &str = "Debug";

#[derive(Debug, Clone)]
struct TargetSpec {
    name: String,
    kind: String,
    artifacts: Vec<String>,
    sources: Vec<String>,
    libraries: Vec<String>,
}

impl TargetSpec {
    fn descriptor(&self) -> Value {
        let mut descriptor = json!({
            "name": self.name,
            "type": self.kind,
            "artifacts": self.artifacts.iter().map(|p| json!({ "path": p })).collect::<Vec<_>>(),
            "sources": self.sources.iter().map(|p| json!({ "path": p })).collect::<Vec<_>>(),
        });
        if !self.libraries.is_empty() {
            let fragments: Vec<Value> = self
                .libraries
                .iter()
                .map(|f| json!({ "role": "libraries", "fragment": f }))
                .collect();
            descriptor["link"] = json!({
                "language": "C",
                "commandFragments": fragments,
            });
        }
        descriptor
    }

    fn file_name(&self) -> String {
        format!("target-{}.json", self.name)
    }
}

/// Builder for an on-disk build tree with a file-API reply.
///
/// Layout under the temporary root: `build/` (the build root, holding the
/// reply) and `src/` (the source root).
#[derive(Debug)]
pub struct ReplyFixture {
    root: TempDir,
    targets: Vec<TargetSpec>,
}

impl ReplyFixture {
    /// Create an empty fixture in a fresh temporary directory.
    pub fn new() -> Self {
        ReplyFixture {
            root: TempDir::new().unwrap(),
            targets: Vec::new(),
        }
    }

    /// Add a target of any file-API `type`.
    pub fn target(
        mut self,
        name: &str,
        kind: &str,
        artifacts: &[&str],
        sources: &[&str],
        libraries: &[&str],
    ) -> Self {
        self.targets.push(TargetSpec {
            name: name.to_string(),
            kind: kind.to_string(),
            artifacts: artifacts.iter().map(|s| s.to_string()).collect(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            libraries: libraries.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Add an `EXECUTABLE` target.
    pub fn executable(self, name: &str, artifact: &str, sources: &[&str], libraries: &[&str]) -> Self {
        self.target(name, "EXECUTABLE", &[artifact], sources, libraries)
    }

    /// Add a `SHARED_LIBRARY` target.
    pub fn shared_library(
        self,
        name: &str,
        artifact: &str,
        sources: &[&str],
        libraries: &[&str],
    ) -> Self {
        self.target(name, "SHARED_LIBRARY", &[artifact], sources, libraries)
    }

    /// Write the index, codemodel and target descriptors to disk.
    pub fn write(self) -> Self {
        let reply = self.reply_path();
        std::fs::create_dir_all(&reply).unwrap();
        std::fs::create_dir_all(self.source_root()).unwrap();

        let refs: Vec<Value> = self
            .targets
            .iter()
            .map(|t| json!({ "name": t.name, "id": format!("{}::@6890427a1f51a3e7e1df", t.name), "jsonFile": t.file_name() }))
            .collect();
        let codemodel = json!({
            "kind": "codemodel",
            "version": { "major": 2, "minor": 6 },
            "paths": {
                "build": self.build_root(),
                "source": self.source_root(),
            },
            "configurations": [{ "name": CONFIGURATION, "targets": refs }],
        });
        write_json(&reply.join("codemodel-v2.json"), &codemodel);

        for target in &self.targets {
            write_json(&reply.join(target.file_name()), &target.descriptor());
        }

        let index = json!({
            "cmake": { "version": { "string": "3.28.3" } },
            "objects": [{ "kind": "codemodel", "jsonFile": "codemodel-v2.json" }],
            "reply": {
                "codemodel-v2": { "kind": "codemodel", "jsonFile": "codemodel-v2.json" }
            },
        });
        write_json(&reply.join("index-2024-03-01T10-00-00-0000.json"), &index);

        self
    }

    /// The temporary root holding `build/` and `src/`.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// The build root.
    pub fn build_root(&self) -> PathBuf {
        self.root.path().join("build")
    }

    /// The source root.
    pub fn source_root(&self) -> PathBuf {
        self.root.path().join("src")
    }

    /// Reply directory relative to the build root.
    pub fn reply_dir(&self) -> PathBuf {
        PathBuf::from(REPLY_DIR)
    }

    /// Absolute reply directory.
    pub fn reply_path(&self) -> PathBuf {
        self.build_root().join(REPLY_DIR)
    }

    /// Absolute path of a target's descriptor file.
    pub fn target_path(&self, name: &str) -> PathBuf {
        self.reply_path().join(format!("target-{}.json", name))
    }
}

impl Default for ReplyFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Build a [`Target`] in memory. Every entry of `libraries` becomes a
/// `libraries`-role link fragment.
pub fn target(
    name: &str,
    kind: &str,
    artifacts: &[&str],
    sources: &[&str],
    libraries: &[&str],
) -> Target {
    Target {
        name: name.to_string(),
        kind: TargetKind::from_cmake(kind),
        artifacts: artifacts.iter().map(PathBuf::from).collect(),
        sources: sources.iter().map(PathBuf::from).collect(),
        link_fragments: libraries
            .iter()
            .map(|f| LinkFragment {
                role: FragmentRole::Libraries,
                fragment: f.to_string(),
            })
            .collect(),
        descriptor_path: PathBuf::from(format!("target-{}.json", name)),
        descriptor: json!({ "name": name, "type": kind }),
    }
}

/// Build a [`DependencyGraph`] straight from `(artifact, deps)` edges.
pub fn graph_from(executable: Option<&str>, edges: &[(&str, &[&str])]) -> DependencyGraph {
    let mut graph = DependencyGraph::default();
    for (artifact, deps) in edges {
        graph.insert(*artifact, deps.iter().map(PathBuf::from).collect());
    }
    if let Some(executable) = executable {
        graph.set_executable(executable);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout() {
        let reply = ReplyFixture::new()
            .executable("app", "app", &["main.c"], &[])
            .write();

        assert!(reply.target_path("app").is_file());
        assert!(reply.reply_path().join("codemodel-v2.json").is_file());
        assert!(reply.source_root().is_dir());
    }

    #[test]
    fn test_graph_from() {
        let graph = graph_from(Some("E"), &[("E", &["a.c"])]);
        assert_eq!(graph.executable(), Some(Path::new("E")));
        assert_eq!(graph.len(), 1);
    }
}
