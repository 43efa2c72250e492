//! Cargo.toml manifests as typed, format-preserving documents.
//!
//! A manifest is always loaded whole, mutated through the field-level
//! operations below, and stored whole. Anything an operation does not name is
//! left exactly as it was, comments and key order included.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use toml_edit::{value, Array, DocumentMut, InlineTable, Item, Table};

use crate::core::error::{GraphError, ParseError};
use crate::util::fs;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Cargo.toml";

/// One entry of `lib.crate-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateType {
    /// A C-ABI dynamic library
    Cdylib,
    /// A Rust library other crates can link against
    Lib,
}

impl CrateType {
    /// The Cargo spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrateType::Cdylib => "cdylib",
            CrateType::Lib => "lib",
        }
    }
}

impl fmt::Display for CrateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded Cargo manifest.
#[derive(Debug, Clone)]
pub struct CargoManifest {
    path: PathBuf,
    doc: DocumentMut,
}

impl CargoManifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse manifest text that is to be stored at `path`.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let doc: DocumentMut = content.parse().map_err(|source| {
            GraphError::from(ParseError::Manifest {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Ok(CargoManifest {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Write the manifest back to where it was loaded from.
    pub fn save(&self) -> Result<()> {
        fs::write_string(&self.path, &self.doc.to_string())
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove a top-level section. Returns whether it was present.
    pub fn remove_section(&mut self, name: &str) -> bool {
        self.doc.remove(name).is_some()
    }

    /// Set `lib.crate-type`.
    pub fn set_crate_types(&mut self, types: &[CrateType]) -> Result<()> {
        let array: Array = types.iter().map(CrateType::as_str).collect();
        self.table_mut("lib")?["crate-type"] = value(array);
        Ok(())
    }

    /// Read back `lib.crate-type`.
    pub fn crate_types(&self) -> Vec<String> {
        self.doc
            .get("lib")
            .and_then(|lib| lib.get("crate-type"))
            .and_then(Item::as_array)
            .map(|array| {
                array
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set `lib.name`.
    pub fn set_lib_name(&mut self, name: &str) -> Result<()> {
        self.table_mut("lib")?["name"] = value(name);
        Ok(())
    }

    /// Set `package.name`.
    pub fn set_package_name(&mut self, name: &str) -> Result<()> {
        self.table_mut("package")?["name"] = value(name);
        Ok(())
    }

    /// Get `package.name`.
    pub fn package_name(&self) -> Option<&str> {
        self.doc
            .get("package")
            .and_then(|package| package.get("name"))
            .and_then(Item::as_str)
    }

    /// Replace `workspace.members`.
    pub fn set_workspace_members(&mut self, members: &[String]) -> Result<()> {
        let array: Array = members.iter().map(String::as_str).collect();
        self.table_mut("workspace")?["members"] = value(array);
        Ok(())
    }

    /// Add or replace `dependencies.<name> = { path = "<path>" }`.
    pub fn add_path_dependency(&mut self, name: &str, path: &str) -> Result<()> {
        let mut dep = InlineTable::new();
        dep.insert("path", path.into());
        self.table_mut("dependencies")?[name] = Item::Value(dep.into());
        Ok(())
    }

    /// Get a top-level table, creating a standard table when missing.
    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let path = self.path.display().to_string();
        self.doc
            .entry(name)
            .or_insert(Item::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow!("`{}` in {} is not a table", name, path))
    }
}

impl fmt::Display for CargoManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"# generated crate
[package]
name = "app"
version = "0.1.0"
edition = "2021"

[lib]
path = "lib.rs"
crate-type = ["staticlib"]

[[bin]]
name = "app"
path = "main.rs"

[dependencies]
libc = "0.2"

[workspace]
members = []

[profile.release]
opt-level = 3
"#;

    fn manifest() -> CargoManifest {
        CargoManifest::parse(Path::new("Cargo.toml"), TEMPLATE).unwrap()
    }

    fn as_value(manifest: &CargoManifest) -> toml::Value {
        toml::from_str(&manifest.to_string()).unwrap()
    }

    #[test]
    fn test_crate_types() {
        let mut m = manifest();
        m.set_crate_types(&[CrateType::Cdylib, CrateType::Lib]).unwrap();
        assert_eq!(m.crate_types(), vec!["cdylib", "lib"]);
    }

    #[test]
    fn test_remove_sections() {
        let mut m = manifest();
        assert!(m.remove_section("bin"));
        assert!(m.remove_section("workspace"));
        assert!(!m.remove_section("workspace"));

        let text = m.to_string();
        assert!(!text.contains("[[bin]]"));
        assert!(!text.contains("[workspace]"));
    }

    #[test]
    fn test_rewrite_preserves_untouched_fields() {
        let mut m = manifest();
        m.set_crate_types(&[CrateType::Lib]).unwrap();
        m.set_workspace_members(&["crates/foo".to_string()]).unwrap();
        m.add_path_dependency("foo", "crates/foo").unwrap();

        let mut expected: toml::Value = toml::from_str(TEMPLATE).unwrap();
        expected["lib"]["crate-type"] = toml::Value::Array(vec!["lib".into()]);
        expected["workspace"]["members"] = toml::Value::Array(vec!["crates/foo".into()]);
        let mut foo = toml::Table::new();
        foo.insert("path".to_string(), "crates/foo".into());
        expected["dependencies"]
            .as_table_mut()
            .unwrap()
            .insert("foo".to_string(), toml::Value::Table(foo));

        assert_eq!(as_value(&m), expected);
        assert!(m.to_string().starts_with("# generated crate\n"));
    }

    #[test]
    fn test_missing_tables_are_created() {
        let mut m = CargoManifest::parse(
            Path::new("Cargo.toml"),
            "[package]\nname = \"bare\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        m.set_crate_types(&[CrateType::Cdylib]).unwrap();
        m.add_path_dependency("foo", "crates/foo").unwrap();
        m.set_workspace_members(&["crates/foo".to_string()]).unwrap();

        let text = m.to_string();
        assert!(text.contains("[lib]"));
        assert!(text.contains("[dependencies]"));
        assert!(text.contains("[workspace]"));
        assert_eq!(m.crate_types(), vec!["cdylib"]);
        assert_eq!(m.package_name(), Some("bare"));
    }

    #[test]
    fn test_names() {
        let mut m = manifest();
        m.set_lib_name("foo").unwrap();
        m.set_package_name("foo").unwrap();

        let v = as_value(&m);
        assert_eq!(v["lib"]["name"].as_str(), Some("foo"));
        assert_eq!(v["package"]["name"].as_str(), Some("foo"));
        assert_eq!(v["package"]["version"].as_str(), Some("0.1.0"));
    }

    #[test]
    fn test_malformed_manifest_is_parse_error() {
        let err = CargoManifest::parse(Path::new("broken/Cargo.toml"), "[package\n").unwrap_err();
        let graph_err = err.downcast_ref::<GraphError>().unwrap();
        assert!(matches!(
            graph_err,
            GraphError::Parse(ParseError::Manifest { .. })
        ));
    }

    #[test]
    fn test_save_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&path, TEMPLATE).unwrap();

        let m = CargoManifest::load(&path).unwrap();
        m.save().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
    }
}
