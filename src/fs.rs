//! File-system helpers shared by the mergers and the orchestrator.
use std::path::{Path, PathBuf};

use crate::error::MergeError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), MergeError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MergeError::io(parent, e))?;
    }
    Ok(())
}

/// Read `path` as text, or `None` if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read_optional(path: &Path) -> Result<Option<String>, MergeError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MergeError::io(path, e)),
    }
}

/// Write `content` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns an error if the parent directory or the file cannot be written.
pub fn write(path: &Path, content: impl AsRef<[u8]>) -> Result<(), MergeError> {
    ensure_parent_dir(path)?;
    std::fs::write(path, content).map_err(|e| MergeError::io(path, e))
}

/// Delete the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be removed.
pub fn remove(path: &Path) -> Result<(), MergeError> {
    std::fs::remove_file(path).map_err(|e| MergeError::io(path, e))
}

/// Every regular file below `dir`, as paths relative to `dir`, sorted.
///
/// Symlinks to directories are skipped, so link cycles cannot recurse.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed.
pub fn files_under(dir: &Path) -> Result<Vec<PathBuf>, MergeError> {
    let mut files = Vec::new();
    collect_files(dir, Path::new(""), &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(root: &Path, relative: &Path, out: &mut Vec<PathBuf>) -> Result<(), MergeError> {
    let dir = root.join(relative);
    for entry in std::fs::read_dir(&dir).map_err(|e| MergeError::io(&dir, e))? {
        let entry = entry.map_err(|e| MergeError::io(&dir, e))?;
        let rel = relative.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| MergeError::io(entry.path(), e))?;
        if file_type.is_dir() {
            collect_files(root, &rel, out)?;
        } else if !(file_type.is_symlink() && entry.path().is_dir()) {
            out.push(rel);
        }
    }
    Ok(())
}
