//! Core data structures for carve.
//!
//! This module contains the build graph and everything it is read from:
//! - File-API loading (CodeModel, Target)
//! - Artifact dependency resolution (DependencyGraph)
//! - Reachability and partitioning (Traversal)
//! - Cargo manifest editing (CargoManifest)

pub mod codemodel;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod reach;
pub mod target;

pub use codemodel::CodeModel;
pub use error::{ConfigError, GraphError, GraphResult, ParseError, StructureError};
pub use graph::DependencyGraph;
pub use manifest::{CargoManifest, CrateType, MANIFEST_NAME};
pub use reach::{Classifier, Mode, NodeClass, Partition, Reach, Traversal};
pub use target::{FragmentRole, LinkFragment, Target, TargetKind};
