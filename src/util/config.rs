//! Configuration file support for carve.
//!
//! carve reads two optional configuration files:
//! - Global: `~/.carve/config.toml` - User-wide defaults
//! - Project: `.carve/config.toml` - Overrides for the current directory
//!
//! Project config takes precedence over global config. Every field has a
//! default, so an absent file means the stock CMake/Linux layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::diagnostic::suggestions;

/// Resolved carve configuration: defaults with every config file applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Where things live on disk
    pub layout: LayoutConfig,

    /// How dependency paths are classified
    pub classify: ClassifyConfig,

    /// Which template files are copied into every generated crate
    pub scaffold: ScaffoldConfig,

    /// Build-script rewriting
    pub link_args: LinkArgsConfig,
}

/// Directory layout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// File-API reply directory, relative to the build root
    pub reply_dir: PathBuf,

    /// Directory holding generated crates, relative to the Rust root
    pub units_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            reply_dir: PathBuf::from(".cmake/api/v1/reply"),
            units_dir: "crates".to_string(),
        }
    }
}

/// Path classification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyConfig {
    /// Extensions of compiled translation units
    pub source_extensions: Vec<String>,

    /// Extension of dynamic libraries
    pub dylib_extension: String,

    /// File-name prefix stripped from dynamic libraries to name their crate
    pub dylib_prefix: String,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        ClassifyConfig {
            source_extensions: vec!["c".to_string()],
            dylib_extension: "so".to_string(),
            dylib_prefix: "lib".to_string(),
        }
    }
}

/// Crate scaffolding settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldConfig {
    /// Directories copied recursively from the Rust root
    pub template_dirs: Vec<String>,

    /// Files that must exist in the Rust root and are copied
    pub template_files: Vec<String>,

    /// Files copied only when present
    pub optional_files: Vec<String>,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        ScaffoldConfig {
            template_dirs: vec!["src".to_string()],
            template_files: vec!["lib.rs".to_string()],
            optional_files: vec!["stdio.rs".to_string(), "c_lib.rs".to_string()],
        }
    }
}

/// Build-script rewriting settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkArgsConfig {
    /// Zero-based line index the link statements are inserted before
    pub insert_line: usize,
}

impl Default for LinkArgsConfig {
    fn default() -> Self {
        LinkArgsConfig { insert_line: 4 }
    }
}

/// One configuration file as written: every key is optional, so a file only
/// overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub layout: LayoutFile,
    pub classify: ClassifyFile,
    pub scaffold: ScaffoldFile,
    pub link_args: LinkArgsFile,
}

/// `[layout]` as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayoutFile {
    pub reply_dir: Option<PathBuf>,
    pub units_dir: Option<String>,
}

/// `[classify]` as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClassifyFile {
    pub source_extensions: Option<Vec<String>>,
    pub dylib_extension: Option<String>,
    pub dylib_prefix: Option<String>,
}

/// `[scaffold]` as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScaffoldFile {
    pub template_dirs: Option<Vec<String>>,
    pub template_files: Option<Vec<String>>,
    pub optional_files: Option<Vec<String>>,
}

/// `[link-args]` as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LinkArgsFile {
    pub insert_line: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents).with_context(|| {
            format!(
                "failed to parse config: {}\n{}",
                path.display(),
                suggestions::BAD_CONFIG
            )
        })
    }

    /// Load the file at `path` if it exists, otherwise `None`.
    fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl Config {
    /// Merge a config file into this one (the file takes precedence).
    ///
    /// Only keys the file sets are replaced.
    pub fn merge(&mut self, other: ConfigFile) {
        // Layout
        if let Some(reply_dir) = other.layout.reply_dir {
            self.layout.reply_dir = reply_dir;
        }
        if let Some(units_dir) = other.layout.units_dir {
            self.layout.units_dir = units_dir;
        }

        // Classification
        if let Some(exts) = other.classify.source_extensions {
            self.classify.source_extensions = exts;
        }
        if let Some(ext) = other.classify.dylib_extension {
            self.classify.dylib_extension = ext;
        }
        if let Some(prefix) = other.classify.dylib_prefix {
            self.classify.dylib_prefix = prefix;
        }

        // Scaffold
        if let Some(dirs) = other.scaffold.template_dirs {
            self.scaffold.template_dirs = dirs;
        }
        if let Some(files) = other.scaffold.template_files {
            self.scaffold.template_files = files;
        }
        if let Some(files) = other.scaffold.optional_files {
            self.scaffold.optional_files = files;
        }

        // Link args
        if let Some(line) = other.link_args.insert_line {
            self.link_args.insert_line = line;
        }
    }

    /// Load merged configuration for a working directory.
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Project config (`<cwd>/.carve/config.toml`)
    /// 2. Global config (`~/.carve/config.toml`)
    /// 3. Defaults
    pub fn discover(cwd: &Path) -> Result<Self> {
        let global = global_config_path();
        Self::layered(global.as_deref(), &project_config_path(cwd))
    }

    /// Defaults, then `global` when given, then `project`. Missing files are
    /// skipped; a file that exists but does not parse is an error.
    pub fn layered(global: Option<&Path>, project: &Path) -> Result<Self> {
        let mut config = Config::default();

        if let Some(global_path) = global {
            if let Some(file) = ConfigFile::load_if_exists(global_path)? {
                config.merge(file);
            }
        }

        if let Some(file) = ConfigFile::load_if_exists(project)? {
            config.merge(file);
        }

        Ok(config)
    }
}

/// Get the global carve config directory (~/.carve).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".carve"))
}

/// Get the global config path (~/.carve/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.carve/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".carve").join("config.toml")
}
