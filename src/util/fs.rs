//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Recursively copy a directory.
///
/// Fails if `dst` already exists, so a scaffold never merges into a stale tree.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        bail!("destination `{}` already exists", dst.display());
    }
    copy_dir_contents(src, dst)
}

fn copy_dir_contents(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in fs::read_dir(src)
        .with_context(|| format!("failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_contents(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Copy a single file, with nice error messages.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find entries in `dir` whose file name matches a glob `pattern`.
///
/// Only the file name is matched, so a directory path containing glob
/// metacharacters is safe. Results are sorted.
pub fn glob_in(dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let mut results = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            results.push(entry.path());
        }
    }

    results.sort();
    Ok(results)
}

/// Normalize a path lexically: drop `.` components and resolve `..` against
/// the component before it.
///
/// The file system is never consulted, so paths to files that no longer exist
/// still compare equal. `..` at the root is dropped; leading `..` of a
/// relative path is kept.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    let out: PathBuf = parts.iter().map(|c| c.as_os_str()).collect();
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_in() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index-2024.json"), "{}").unwrap();
        fs::write(tmp.path().join("codemodel-v2-abc.json"), "{}").unwrap();

        let files = glob_in(tmp.path(), "index-*.json").unwrap();
        assert_eq!(files, vec![tmp.path().join("index-2024.json")]);
    }

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("file.txt"), "content").unwrap();
        fs::write(src.join("nested/inner.rs"), "fn main() {}").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("file.txt")).unwrap(), "content");
        assert!(dst.join("nested/inner.rs").exists());
    }

    #[test]
    fn test_copy_dir_all_refuses_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(tmp.path().join("dst")).unwrap();

        assert!(copy_dir_all(&src, &tmp.path().join("dst")).is_err());
    }

    #[test]
    fn test_normalize_lexical() {
        assert_eq!(
            normalize_lexical(Path::new("/src/./lib//a.c")),
            PathBuf::from("/src/lib/a.c")
        );
        assert_eq!(normalize_lexical(Path::new("./a.c")), PathBuf::from("a.c"));
        assert_eq!(
            normalize_lexical(Path::new("/x/build/../src/main.c")),
            PathBuf::from("/x/src/main.c")
        );
        assert_eq!(normalize_lexical(Path::new("/../b.c")), PathBuf::from("/b.c"));
        assert_eq!(
            normalize_lexical(Path::new("../../a/../b.c")),
            PathBuf::from("../../b.c")
        );
        assert_eq!(normalize_lexical(Path::new("a/..")), PathBuf::from("."));
    }
}
