//! Target definitions - one buildable unit of the native build graph.
//!
//! A Target is read once from its file-API descriptor and never mutated.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The kind of target, as reported by the descriptor `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// `EXECUTABLE`
    Executable,

    /// `SHARED_LIBRARY`
    SharedLibrary,

    /// `OBJECT_LIBRARY`: one object artifact per source
    ObjectLibrary,

    /// Static, module, interface and utility targets
    Other(String),
}

impl TargetKind {
    /// Parse the file-API `type` string.
    pub fn from_cmake(kind: &str) -> Self {
        match kind {
            "EXECUTABLE" => TargetKind::Executable,
            "SHARED_LIBRARY" => TargetKind::SharedLibrary,
            "OBJECT_LIBRARY" => TargetKind::ObjectLibrary,
            other => TargetKind::Other(other.to_string()),
        }
    }

    /// The file-API spelling of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            TargetKind::Executable => "EXECUTABLE",
            TargetKind::SharedLibrary => "SHARED_LIBRARY",
            TargetKind::ObjectLibrary => "OBJECT_LIBRARY",
            TargetKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a link command fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FragmentRole {
    Flags,
    Libraries,
    LibraryPath,
    FrameworkPath,
    #[serde(other)]
    Other,
}

/// One `link.commandFragments` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkFragment {
    pub role: FragmentRole,
    pub fragment: String,
}

/// What a `libraries`-role fragment contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryFragment<'a> {
    /// `-lm`: resolved by the downstream linker, never part of the graph
    SystemLibrary(&'a str),

    /// Any other `-` flag, e.g. `-Wl,-rpath,...`
    Flag(&'a str),

    /// Archive, object or dynamic library path, relative to the build root
    Path(&'a Path),
}

impl LinkFragment {
    /// Classify a fragment; `None` for roles other than `libraries`.
    pub fn library(&self) -> Option<LibraryFragment<'_>> {
        if self.role != FragmentRole::Libraries {
            return None;
        }

        let fragment = self.fragment.trim();
        Some(if fragment.starts_with("-l") {
            LibraryFragment::SystemLibrary(fragment)
        } else if fragment.starts_with('-') {
            LibraryFragment::Flag(fragment)
        } else {
            LibraryFragment::Path(Path::new(fragment))
        })
    }

    /// The raw flag if this is a `-l` system library fragment.
    pub fn system_library(&self) -> Option<&str> {
        match self.library()? {
            LibraryFragment::SystemLibrary(flag) => Some(flag),
            _ => None,
        }
    }
}

/// A build target with everything the resolver needs.
#[derive(Debug, Clone)]
pub struct Target {
    /// Target name
    pub name: String,

    /// Target kind
    pub kind: TargetKind,

    /// Output artifacts, relative to the build root
    pub artifacts: Vec<PathBuf>,

    /// Compiled sources, relative to the source root
    pub sources: Vec<PathBuf>,

    /// Link command fragments in link order
    pub link_fragments: Vec<LinkFragment>,

    /// Descriptor file this target was read from
    pub descriptor_path: PathBuf,

    /// The untouched descriptor document
    pub descriptor: serde_json::Value,
}

impl Target {
    /// Check if this is the executable target.
    pub fn is_executable(&self) -> bool {
        self.kind == TargetKind::Executable
    }

    /// System library flags (`-l...`) this target links against, in link order.
    pub fn system_libraries(&self) -> impl Iterator<Item = &str> {
        self.link_fragments.iter().filter_map(LinkFragment::system_library)
    }

    /// Look up a top-level descriptor field.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.descriptor.get(key)
    }
}
