//! Error types for graph loading, resolution and traversal.
//!
//! Every error here is fatal: a partially understood build graph produces
//! silently wrong partitions, so nothing is skipped or recovered locally.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Result alias used by the core graph modules.
pub type GraphResult<T> = Result<T, GraphError>;

/// The build tree is not shaped the way a single invocation expects.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("no file-API index found in `{}`", .reply_dir.display())]
    #[diagnostic(
        code(carve::config::no_index),
        help("Create `.cmake/api/v1/query/codemodel-v2` in the build tree and re-run CMake")
    )]
    NoIndex { reply_dir: PathBuf },

    #[error("found {} file-API index files in `{}`", .found.len(), .reply_dir.display())]
    #[diagnostic(
        code(carve::config::multiple_indexes),
        help("Remove the reply directory and re-run CMake")
    )]
    MultipleIndexes {
        reply_dir: PathBuf,
        found: Vec<PathBuf>,
    },

    #[error("codemodel `{}` has no configurations", .path.display())]
    #[diagnostic(code(carve::config::no_configurations))]
    NoConfigurations { path: PathBuf },

    #[error("the build graph has no executable target")]
    #[diagnostic(code(carve::config::no_executable))]
    NoExecutable,

    #[error("target `{target}` has no field `{field}`")]
    #[diagnostic(code(carve::config::missing_field))]
    MissingField { target: String, field: String },
}

/// A document on disk could not be understood.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ParseError {
    #[error("failed to parse JSON in `{}`", .path.display())]
    #[diagnostic(code(carve::parse::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse manifest `{}`", .path.display())]
    #[diagnostic(code(carve::parse::manifest))]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("record {index} in `{}` has no string `file` field", .path.display())]
    #[diagnostic(code(carve::parse::missing_file))]
    MissingFile { path: PathBuf, index: usize },
}

/// Target descriptors disagree with the shape the resolver relies on.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum StructureError {
    #[error(
        "object library `{target}` has {artifacts} artifacts but {sources} sources"
    )]
    #[diagnostic(code(carve::structure::artifact_source_mismatch))]
    ArtifactSourceMismatch {
        target: String,
        artifacts: usize,
        sources: usize,
    },

    #[error("target `{target}` produces {count} artifacts, expected one")]
    #[diagnostic(code(carve::structure::multiple_artifacts))]
    MultipleArtifacts { target: String, count: usize },

    #[error("target `{target}` produces no artifact")]
    #[diagnostic(code(carve::structure::missing_artifact))]
    MissingArtifact { target: String },

    #[error("more than one executable target: `{}` and `{}`", .first.display(), .second.display())]
    #[diagnostic(code(carve::structure::multiple_executables))]
    MultipleExecutables { first: PathBuf, second: PathBuf },

    #[error("`{}` depends on `{}`, which no target produces", .dependent.display(), .artifact.display())]
    #[diagnostic(code(carve::structure::unknown_artifact))]
    UnknownArtifact {
        artifact: PathBuf,
        dependent: PathBuf,
    },
}

/// Any failure raised while loading or walking the build graph.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GraphError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Structure(#[from] StructureError),

    #[error("failed to read `{}`", .path.display())]
    #[diagnostic(code(carve::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    /// Wrap an I/O failure with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON failure with the document it happened in.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GraphError::Parse(ParseError::Json {
            path: path.into(),
            source,
        })
    }

    /// Convert to a user-friendly diagnostic.
    ///
    /// Carries the error code, and the `help` text last among the suggestions.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = self.detail();
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }
        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }
        diag
    }

    fn detail(&self) -> Diagnostic {
        match self {
            GraphError::Config(ConfigError::NoIndex { reply_dir }) => {
                Diagnostic::error(self.to_string())
                    .with_location(reply_dir)
                    .with_suggestion("Check that the build root argument points at a configured CMake build tree")
            }

            GraphError::Config(ConfigError::MultipleIndexes { found, .. }) => {
                let mut diag = Diagnostic::error(self.to_string());
                for path in found {
                    diag = diag.with_context(format!("found {}", path.display()));
                }
                diag
            }

            GraphError::Config(ConfigError::NoExecutable) => Diagnostic::error(self.to_string())
                .with_suggestion("This operation traces an executable; library-only builds are only supported by `carve partition`"),

            GraphError::Structure(StructureError::MultipleExecutables { first, second }) => {
                Diagnostic::error("more than one executable target")
                    .with_context(format!("first: {}", first.display()))
                    .with_context(format!("second: {}", second.display()))
                    .with_suggestion("Configure a build tree that produces a single executable")
            }

            GraphError::Structure(StructureError::UnknownArtifact { artifact, dependent }) => {
                Diagnostic::error(format!(
                    "dependency `{}` is not produced by any target",
                    artifact.display()
                ))
                .with_context(format!("required by {}", dependent.display()))
                .with_suggestion("Link against build-tree targets only, or pass system libraries as `-l` flags")
            }

            GraphError::Parse(ParseError::Json { path, source }) => {
                Diagnostic::error("failed to parse JSON")
                    .with_location(path)
                    .with_context(source.to_string())
            }

            GraphError::Parse(ParseError::Manifest { path, source }) => {
                Diagnostic::error("failed to parse manifest")
                    .with_location(path)
                    .with_context(source.to_string().trim_end().to_string())
            }

            GraphError::Io { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),

            _ => Diagnostic::error(self.to_string()),
        }
    }
}
