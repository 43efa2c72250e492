//! Carve - split a CMake build graph into per-shared-library Cargo crates
//!
//! This crate reads the CMake file-API reply of a configured build tree,
//! resolves it into an artifact dependency graph, and answers reachability
//! questions over it: which sources end up in the executable, and which
//! sources belong to which shared library.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for carve unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides on-disk file-API reply fixtures and in-memory graph builders.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    codemodel::CodeModel, error::GraphError, graph::DependencyGraph, manifest::CargoManifest,
    reach::Traversal, target::Target,
};

pub use crate::ops::BuildTree;
pub use crate::util::config::Config;
