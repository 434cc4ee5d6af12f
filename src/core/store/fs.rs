//! Filesystem helpers for document persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;

/// Write `contents` to `path` atomically.
///
/// Writes a temporary sibling file and renames it over the target, so a
/// reader sees either the old or the new document. Existing permissions are
/// kept; missing parent directories are created.
///
/// # Errors
///
/// Returns an IO error if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = parent_directory(path);
    fs::create_dir_all(&dir)?;

    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(contents)?;
    file.flush()?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(file.path(), metadata.permissions())?;
    }

    file.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = contents.len(), "document written");
    Ok(())
}

/// Key identifying a document regardless of how its path was spelled.
pub fn lock_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let dir = parent_directory(path);
    match (fs::canonicalize(&dir), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
