//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether anything (including a broken symlink) exists at `path`.
#[must_use]
pub fn path_present(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Remove whatever lives at `path` without following symlinks: a file or
/// link is unlinked, a real directory is removed recursively. Does nothing
/// if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("remove directory: {}", path.display()))?;
    } else {
        remove_link_or_file(path)?;
    }
    Ok(())
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> Result<()> {
    // Directory symlinks on Windows need remove_dir.
    std::fs::remove_file(path)
        .or_else(|_| std::fs::remove_dir(path))
        .with_context(|| format!("remove existing: {}", path.display()))
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path) -> Result<()> {
    std::fs::remove_file(path).with_context(|| format!("remove existing: {}", path.display()))
}

/// Recursively copy a directory tree.
///
/// When `skip_git` is `true`, `.git` directories are skipped; useful when
/// adopting a config directory that is itself a repository.
///
/// Symlinks within the source tree are *followed*: their content is copied
/// rather than the link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path, skip_git: bool) -> Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            if skip_git && entry.file_name() == ".git" {
                continue;
            }
            copy_dir_recursive(&src_path, &dst_path, skip_git)?;
        } else {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    Ok(())
}

/// Copy a file or a directory tree from `src` to `dst`.
///
/// # Errors
///
/// Returns an error if any part of the copy fails.
pub fn copy_path(src: &Path, dst: &Path, skip_git: bool) -> Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst, skip_git)
    } else {
        std::fs::copy(src, dst)
            .map(|_| ())
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))
    }
}

/// Write `contents` to `path` so readers never observe a partial file.
///
/// The data is written to a scratch file in the same directory, given
/// `mode` (Unix only) and then renamed over `path`.
///
/// # Errors
///
/// Returns an error if the scratch file cannot be created, written or
/// renamed into place.
pub fn write_atomic(path: &Path, contents: &[u8], mode: Option<u32>) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut scratch = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create scratch file in {}", parent.display()))?;
    scratch
        .write_all(contents)
        .and_then(|()| scratch.as_file().sync_all())
        .with_context(|| format!("write scratch file for {}", path.display()))?;
    if let Some(mode) = mode {
        set_mode(scratch.path(), mode)?;
    }
    scratch
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("move into place: {}", path.display()))?;
    Ok(())
}

/// Set Unix permission bits on `path`. No-op elsewhere.
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("chmod {mode:o} {}", path.display()))
}

/// Set Unix permission bits on `path`. No-op elsewhere.
///
/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Unix permission bits of `path`, if available.
#[cfg(unix)]
#[must_use]
pub fn mode_of(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path)
        .ok()
        .map(|m| m.permissions().mode() & 0o7777)
}

/// Unix permission bits of `path`, if available.
#[cfg(not(unix))]
#[must_use]
pub const fn mode_of(_path: &Path) -> Option<u32> {
    None
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link).with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            target.display()
        )
    })?;

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

/// Whether `link` is a symlink that resolves to the same location as
/// `expected`.
///
/// Compares the raw link text first, then canonical paths so relative links
/// and links through symlinked parents are recognised.
#[must_use]
pub fn link_points_to(link: &Path, expected: &Path) -> bool {
    let Ok(raw) = std::fs::read_link(link) else {
        return false;
    };
    if raw == expected {
        return true;
    }
    match (link.canonicalize(), expected.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
