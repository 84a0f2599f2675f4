//! Date-stamped backups of files and directories about to be replaced.
//!
//! `docker-compose.yml` is moved aside to `docker-compose-20240131.yml`, or
//! `docker-compose-20240131.1.yml`, `.2`, ... when that name is taken. A
//! directory such as `services` becomes `services-20240131`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Today's date in the form used in backup names.
pub fn today() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// The first free backup name for `path` on `date`, where `taken` reports
/// whether a candidate already exists.
pub fn backup_name(path: &Path, date: &str, taken: impl Fn(&Path) -> bool) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let first = path.with_file_name(format!("{stem}-{date}{ext}"));
    if !taken(&first) {
        return first;
    }
    let mut n: u32 = 1;
    loop {
        let candidate = path.with_file_name(format!("{stem}-{date}.{n}{ext}"));
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Rename `path` to its first free backup name for today and return it.
pub fn backup(path: &Path) -> Result<PathBuf> {
    let target = backup_name(path, &today(), |p| p.exists());
    std::fs::rename(path, &target).map_err(|e| Error::write("back up", path, e))?;
    log::info!("Backed up {} to {}", path.display(), target.display());
    Ok(target)
}
