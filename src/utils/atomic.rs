//! Atomic file operations
//!
//! The persisted log is replaced as a whole on every append, so a crash in the
//! middle of a write must never leave a truncated document behind.
//!
//! # Pattern
//!
//! 1. Write to a temporary file (.tmp) next to the target
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! The target is therefore either the old document or the new one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Path of the temporary sibling used while replacing `path`
///
/// `.tmp` is appended to the full file name, so the result never equals `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace the file at `path` with `content`
///
/// Parent directories are created as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(content)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Remove the temp sibling of `path` left by an interrupted write
///
/// Returns whether a file was removed. Nothing else in the directory is touched.
pub fn remove_stale_temp<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    let temp_path = temp_path_for(path.as_ref());

    match fs::remove_file(&temp_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
