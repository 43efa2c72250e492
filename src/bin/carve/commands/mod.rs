//! Command implementations

pub mod completions;
pub mod filter;
pub mod link_args;
pub mod partition;
pub mod plan;
pub mod query;

use std::path::PathBuf;

use anyhow::Result;

use carve::util::Config;

/// Configuration for the current directory: defaults, then the global file,
/// then the project file.
pub fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir()?;
    Config::discover(&cwd)
}

/// Path as given on the command line, made absolute against the current
/// directory so graph paths and command-file paths compare equal.
pub fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
