use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            tracing::debug!("Found {filename} in {}", current.display());
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        tracing::trace!("Creating directory {}", path.display());
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Whether `path` is set and points at an existing regular file.
pub fn is_regular_file(path: Option<&Path>) -> bool {
    path.is_some_and(Path::is_file)
}

/// Copy `src` to `dest`, creating parent directories and replacing any
/// existing file at `dest`.
pub fn copy_replacing(src: &Path, dest: &Path) -> std::io::Result<u64> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    std::fs::copy(src, dest)
}

/// Total size of a directory tree in bytes. Missing directories count as zero.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
