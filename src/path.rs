//! Existence checks, entry file discovery and entry name validation.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Whether `path` exists. Errors other than "not found" are reported.
pub fn exists(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::read(path, e)),
    }
}

/// Fail with [`Error::NotFound`] naming `what` unless `path` exists.
pub fn require(what: &str, path: &Path) -> Result<()> {
    if exists(path)? {
        Ok(())
    } else {
        Err(Error::not_found(what, path))
    }
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::read(path, e))
}

/// Create or truncate `path` and write `text` to it.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| Error::write("write", path, e))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Whether `dir` is a directory with at least one entry in it.
pub fn is_non_empty_dir(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;
    Ok(entries.next().is_some())
}

/// Entry files directly inside `dir` with the extension `ext`, sorted by
/// file name. Subdirectories and other files are skipped.
pub fn discover_entries(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory");
        return Err(Error::read(dir, e));
    }
    let mut found = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::read(dir, e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            log::debug!("Skipping directory {}", path.display());
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            log::warn!("Skipping {}: not a .{} file", path.display(), ext);
            continue;
        }
        found.push(path.to_path_buf());
    }
    Ok(found)
}

/// Reject entry names that cannot be used as a file name inside the entry
/// directory.
pub fn validate_entry_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(Error::InvalidEntryName {
            name: name.to_string(),
        });
    }
    Ok(())
}
