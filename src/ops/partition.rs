//! Implementation of `carve partition` and `carve plan`.
//!
//! Splits the executable's sources at shared library boundaries and gives
//! every non-empty shared library partition its own crate, scaffolded from
//! the top-level Rust project.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::manifest::{CargoManifest, CrateType, MANIFEST_NAME};
use crate::core::reach::{Classifier, Partition, Traversal};
use crate::ops::BuildTree;
use crate::util::config::{ClassifyConfig, ScaffoldConfig};
use crate::util::fs;

/// Partitions of a build, before anything is written.
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    /// The executable root, `None` for a library-only build
    pub executable: Option<PathBuf>,
    /// Root partition first, then one per shared library
    pub partitions: Vec<Partition>,
}

impl PartitionPlan {
    /// The partitions that become crates, in discovery order.
    pub fn unit_partitions<'a>(
        &'a self,
        classifier: &'a Classifier,
    ) -> impl Iterator<Item = &'a Partition> + 'a {
        self.partitions
            .iter()
            .filter(move |p| classifier.is_dylib(&p.artifact) && !p.sources.is_empty())
    }

    /// Shared library partitions that own no sources.
    pub fn empty_partitions<'a>(
        &'a self,
        classifier: &'a Classifier,
    ) -> impl Iterator<Item = &'a Partition> + 'a {
        self.partitions
            .iter()
            .filter(move |p| classifier.is_dylib(&p.artifact) && p.sources.is_empty())
    }
}

/// A generated crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Crate, library and package name
    pub name: String,
    /// Shared library the crate stands for
    pub artifact: PathBuf,
    /// Workspace member path, relative to the Rust root
    pub member: String,
    /// Number of sources in the partition
    pub sources: usize,
    /// Shared libraries directly below this one
    pub libs: Vec<PathBuf>,
}

/// What a partition run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionResult {
    /// No executable: the top-level crate became a cdylib
    LibraryOnly { manifest: PathBuf },
    /// Executable build: zero or more crates were generated
    Workspace {
        units: Vec<Unit>,
        /// Shared libraries skipped for owning no sources
        skipped: Vec<PathBuf>,
    },
}

/// Compute the partitions without touching the Rust project.
pub fn plan(tree: &BuildTree) -> Result<PartitionPlan> {
    let graph = tree.graph()?;
    let classifier = tree.classifier();

    let Some(executable) = graph.executable() else {
        return Ok(PartitionPlan {
            executable: None,
            partitions: Vec::new(),
        });
    };

    let partitions = Traversal::new(&graph, &classifier).partitions(executable)?;
    Ok(PartitionPlan {
        executable: Some(executable.to_path_buf()),
        partitions,
    })
}

/// Derive a crate name from a shared library path: `build/libfoo.so` -> `foo`.
pub fn unit_name(artifact: &Path, classify: &ClassifyConfig) -> String {
    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(".{}", classify.dylib_extension);
    let stem = file_name.strip_suffix(suffix.as_str()).unwrap_or(&file_name);
    let base = stem
        .strip_prefix(classify.dylib_prefix.as_str())
        .filter(|rest| !rest.is_empty())
        .unwrap_or(stem);

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Partition the build and rewrite the Rust project at `rust_root`.
///
/// Not transactional: on failure the Rust project must be regenerated.
pub fn partition(tree: &BuildTree, rust_root: &Path) -> Result<PartitionResult> {
    let plan = plan(tree)?;
    let top_path = rust_root.join(MANIFEST_NAME);

    if plan.executable.is_none() {
        tracing::info!("no executable target; building the top-level crate as a cdylib");
        let mut manifest = CargoManifest::load(&top_path)?;
        manifest.set_crate_types(&[CrateType::Cdylib])?;
        manifest.save()?;
        return Ok(PartitionResult::LibraryOnly {
            manifest: manifest.path().to_path_buf(),
        });
    }

    let config = tree.config();
    let classifier = tree.classifier();

    let skipped: Vec<PathBuf> = plan
        .empty_partitions(&classifier)
        .map(|p| p.artifact.clone())
        .collect();
    for artifact in &skipped {
        tracing::debug!("{} owns no sources", artifact.display());
    }

    let mut units = Vec::new();
    for partition in plan.unit_partitions(&classifier) {
        let name = unit_name(&partition.artifact, &config.classify);
        let member = format!("{}/{}", config.layout.units_dir, name);
        let unit_dir = rust_root.join(&member);
        tracing::debug!(
            "scaffolding `{}` for {}",
            name,
            partition.artifact.display()
        );

        scaffold_unit(rust_root, &unit_dir, &config.scaffold)?;
        rewrite_unit_manifest(&unit_dir.join(MANIFEST_NAME), &name)?;

        units.push(Unit {
            name,
            artifact: partition.artifact.clone(),
            member,
            sources: partition.sources.len(),
            libs: partition.libs.iter().cloned().collect(),
        });
    }

    let mut manifest = CargoManifest::load(&top_path)?;
    if !units.is_empty() {
        let members: Vec<String> = units.iter().map(|u| u.member.clone()).collect();
        manifest.set_workspace_members(&members)?;
        for unit in &units {
            manifest.add_path_dependency(&unit.name, &unit.member)?;
        }
    }
    manifest.set_crate_types(&[CrateType::Lib])?;
    manifest.save()?;

    tracing::info!("generated {} crates", units.len());
    Ok(PartitionResult::Workspace { units, skipped })
}

/// Copy the template files of the Rust root into a fresh unit directory.
fn scaffold_unit(rust_root: &Path, unit_dir: &Path, scaffold: &ScaffoldConfig) -> Result<()> {
    fs::ensure_dir(unit_dir)?;
    fs::copy_file(&rust_root.join(MANIFEST_NAME), &unit_dir.join(MANIFEST_NAME))?;

    for dir in &scaffold.template_dirs {
        fs::copy_dir_all(&rust_root.join(dir), &unit_dir.join(dir))?;
    }

    for file in &scaffold.template_files {
        let src = rust_root.join(file);
        if !src.is_file() {
            bail!("template file `{}` not found", src.display());
        }
        fs::copy_file(&src, &unit_dir.join(file))?;
    }

    for file in &scaffold.optional_files {
        let src = rust_root.join(file);
        if src.is_file() {
            fs::copy_file(&src, &unit_dir.join(file))?;
        }
    }

    Ok(())
}

/// Turn a copy of the top-level manifest into a standalone cdylib crate.
fn rewrite_unit_manifest(path: &Path, name: &str) -> Result<()> {
    let mut manifest = CargoManifest::load(path)?;
    manifest.remove_section("bin");
    manifest.remove_section("workspace");
    manifest.set_crate_types(&[CrateType::Cdylib, CrateType::Lib])?;
    manifest.set_lib_name(name)?;
    manifest.set_package_name(name)?;
    manifest.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_rust_project, ReplyFixture, RUST_TEMPLATE};
    use crate::util::Config;

    fn scenario() -> ReplyFixture {
        ReplyFixture::new()
            .executable("app", "app", &[], &["libA.a", "libL1.so"])
            .target("A", "STATIC_LIBRARY", &["libA.a"], &["s1.c", "s2.c"], &[])
            .shared_library("L1", "libL1.so", &["s3.c"], &["libL2.so"])
            .shared_library("L2", "libL2.so", &["s4.c"], &["-lm"])
    }

    fn manifest_value(path: &Path) -> toml::Value {
        toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_unit_name() {
        let classify = ClassifyConfig::default();
        assert_eq!(unit_name(Path::new("/build/libfoo.so"), &classify), "foo");
        assert_eq!(unit_name(Path::new("bar.so"), &classify), "bar");
        assert_eq!(unit_name(Path::new("lib.so"), &classify), "lib");
        assert_eq!(unit_name(Path::new("libfoo.bar.so"), &classify), "foo_bar");
    }

    #[test]
    fn test_plan_scenario() {
        let reply = scenario().write();
        let tree = BuildTree::new(reply.build_root(), Config::default())
            .with_source_root(reply.source_root());

        let plan = plan(&tree).unwrap();
        let classifier = tree.classifier();
        let units: Vec<_> = plan
            .unit_partitions(&classifier)
            .map(|p| p.artifact.clone())
            .collect();

        assert_eq!(plan.partitions.len(), 3);
        assert_eq!(plan.partitions[0].sources.len(), 2);
        assert_eq!(
            units,
            vec![
                reply.build_root().join("libL1.so"),
                reply.build_root().join("libL2.so"),
            ]
        );
    }

    #[test]
    fn test_partition_creates_units_and_rewrites_top_level() {
        let reply = scenario().write();
        let rust_root = reply.root().join("rust");
        write_rust_project(&rust_root);
        let tree = BuildTree::new(reply.build_root(), Config::default())
            .with_source_root(reply.source_root());

        let result = partition(&tree, &rust_root).unwrap();
        let PartitionResult::Workspace { units, skipped } = result else {
            panic!("expected a workspace result");
        };
        assert!(skipped.is_empty());
        assert_eq!(
            units.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            vec!["L1", "L2"]
        );
        assert_eq!(units[0].libs, vec![reply.build_root().join("libL2.so")]);

        let top = manifest_value(&rust_root.join("Cargo.toml"));
        assert_eq!(top["lib"]["crate-type"], toml::Value::Array(vec!["lib".into()]));
        assert_eq!(
            top["workspace"]["members"],
            toml::Value::Array(vec!["crates/L1".into(), "crates/L2".into()])
        );
        assert_eq!(top["dependencies"]["L1"]["path"].as_str(), Some("crates/L1"));
        assert_eq!(top["dependencies"]["L2"]["path"].as_str(), Some("crates/L2"));
        assert!(top.get("bin").is_some());

        let unit_dir = rust_root.join("crates/L1");
        let unit = manifest_value(&unit_dir.join("Cargo.toml"));
        assert_eq!(unit["package"]["name"].as_str(), Some("L1"));
        assert_eq!(unit["lib"]["name"].as_str(), Some("L1"));
        assert_eq!(
            unit["lib"]["crate-type"],
            toml::Value::Array(vec!["cdylib".into(), "lib".into()])
        );
        assert!(unit.get("bin").is_none());
        assert!(unit.get("workspace").is_none());
        assert!(unit["dependencies"].get("L2").is_none());
        assert!(unit_dir.join("lib.rs").exists());
        assert!(unit_dir.join("src/main.rs").exists());
        assert!(unit_dir.join("c_lib.rs").exists());
        assert!(!unit_dir.join("stdio.rs").exists());
    }

    #[test]
    fn test_partition_without_shared_libraries_only_sets_crate_type() {
        let reply = ReplyFixture::new()
            .executable("app", "app", &["main.c"], &["libA.a"])
            .target("A", "STATIC_LIBRARY", &["libA.a"], &["a.c"], &[])
            .write();
        let rust_root = reply.root().join("rust");
        write_rust_project(&rust_root);
        let tree = BuildTree::new(reply.build_root(), Config::default())
            .with_source_root(reply.source_root());

        let result = partition(&tree, &rust_root).unwrap();
        assert_eq!(
            result,
            PartitionResult::Workspace {
                units: Vec::new(),
                skipped: Vec::new()
            }
        );

        let top = manifest_value(&rust_root.join("Cargo.toml"));
        let mut expected: toml::Value = toml::from_str(RUST_TEMPLATE).unwrap();
        expected["lib"]["crate-type"] = toml::Value::Array(vec!["lib".into()]);
        assert_eq!(top, expected);
        assert!(!rust_root.join("crates").exists());
    }

    #[test]
    fn test_library_only_build_becomes_cdylib() {
        let reply = ReplyFixture::new()
            .shared_library("core", "libcore.so", &["s1.c"], &[])
            .write();
        let rust_root = reply.root().join("rust");
        write_rust_project(&rust_root);
        let tree = BuildTree::new(reply.build_root(), Config::default())
            .with_source_root(reply.source_root());

        let result = partition(&tree, &rust_root).unwrap();
        assert_eq!(
            result,
            PartitionResult::LibraryOnly {
                manifest: rust_root.join("Cargo.toml"),
            }
        );

        let top = manifest_value(&rust_root.join("Cargo.toml"));
        assert_eq!(
            top["lib"]["crate-type"],
            toml::Value::Array(vec!["cdylib".into()])
        );
        assert!(!rust_root.join("crates").exists());
    }

    #[test]
    fn test_empty_shared_library_is_skipped() {
        let reply = ReplyFixture::new()
            .executable("app", "app", &["main.c"], &["libempty.so"])
            .shared_library("empty", "libempty.so", &[], &[])
            .write();
        let rust_root = reply.root().join("rust");
        write_rust_project(&rust_root);
        let tree = BuildTree::new(reply.build_root(), Config::default())
            .with_source_root(reply.source_root());

        let result = partition(&tree, &rust_root).unwrap();
        assert_eq!(
            result,
            PartitionResult::Workspace {
                units: Vec::new(),
                skipped: vec![reply.build_root().join("libempty.so")],
            }
        );
    }

    #[test]
    fn test_missing_template_file_is_fatal() {
        let reply = scenario().write();
        let rust_root = reply.root().join("rust");
        write_rust_project(&rust_root);
        std::fs::remove_file(rust_root.join("lib.rs")).unwrap();
        let tree = BuildTree::new(reply.build_root(), Config::default())
            .with_source_root(reply.source_root());

        let err = partition(&tree, &rust_root).unwrap_err();
        assert!(format!("{:#}", err).contains("lib.rs"));
    }
}
