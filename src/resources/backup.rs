//! Timestamped backups taken before any destructive change.
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::helpers::fs;

/// Timestamp format appended to backup names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Copy `path` aside as `<path>.backup-<YYYYMMDD-HHMMSS>`.
///
/// Returns `Ok(None)` when nothing exists at `path`. Regular files are
/// byte-copied, directories are copied recursively and symlinks are
/// recreated with the same link target. A backup taken in the same second
/// replaces the previous one.
///
/// # Errors
///
/// Returns an I/O error if the copy fails; callers must not proceed with
/// the destructive step in that case.
pub fn backup(path: &Path) -> io::Result<Option<PathBuf>> {
    backup_at(path, Local::now())
}

/// [`backup`] with an explicit timestamp.
///
/// # Errors
///
/// Returns an I/O error if the copy fails.
pub fn backup_at(path: &Path, now: DateTime<Local>) -> io::Result<Option<PathBuf>> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(None);
    };

    let dest = backup_path(path, now);
    fs::remove_path(&dest).map_err(to_io)?;

    if meta.is_symlink() {
        let link_target = std::fs::read_link(path)?;
        fs::create_symlink(&link_target, &dest).map_err(to_io)?;
    } else if meta.is_dir() {
        fs::copy_dir_recursive(path, &dest, false).map_err(to_io)?;
    } else {
        std::fs::copy(path, &dest)?;
    }

    Ok(Some(dest))
}

/// Name of the backup for `path` taken at `now`.
#[must_use]
pub fn backup_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup-");
    name.push(now.format(TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

fn to_io(e: anyhow::Error) -> io::Error {
    io::Error::other(format!("{e:#}"))
}
