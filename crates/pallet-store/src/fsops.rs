//! Native filesystem primitives for the staging workflow.
//!
//! Everything here is implemented in-process — no shelling out to `cp`,
//! `mv`, or `mkdir` — so the staging transitions are unit-testable and
//! errors surface as real `io::Error` values instead of captured tool
//! output.

use crate::StoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create a directory under `root` named `base`, or `base.N` for the first
/// free collision-avoiding suffix. Returns the created path.
pub fn create_unique_dir(root: &Path, base: &str) -> Result<PathBuf, StoreError> {
    let mut candidate = root.join(base);
    let mut suffix = 0u32;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                suffix += 1;
                candidate = root.join(format!("{base}.{suffix}"));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Ensure `path` exists as a directory, creating parents as needed.
pub fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Recursively copy all contents of `src` into `dst`.
///
/// `dst` must already exist. Regular files, directories, and symlinks are
/// supported; symlinks are recreated, not followed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), StoreError> {
    if !src.is_dir() {
        return Err(StoreError::NotADirectory(src.display().to_string()));
    }
    if !dst.is_dir() {
        return Err(StoreError::MissingDestination(dst.display().to_string()));
    }
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

fn copy_entry(src: &Path, dst: &Path) -> Result<(), StoreError> {
    let meta = src.symlink_metadata()?;
    let ft = meta.file_type();
    if ft.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else if ft.is_symlink() {
        let target = fs::read_link(src)?;
        std::os::unix::fs::symlink(target, dst)?;
    } else {
        fs::copy(src, dst)?;
    }
    Ok(())
}

/// Recursively move all contents of `src` into `dst`.
///
/// Used when promoting an in-progress build to successful or demoting it
/// to failed. Entries are renamed when possible; a cross-device rename
/// falls back to copy-then-remove.
pub fn move_tree(src: &Path, dst: &Path) -> Result<(), StoreError> {
    if !src.is_dir() {
        return Err(StoreError::NotADirectory(src.display().to_string()));
    }
    if !dst.is_dir() {
        return Err(StoreError::MissingDestination(dst.display().to_string()));
    }
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if let Err(e) = fs::rename(&from, &to) {
            debug!("rename {} -> {} failed ({e}), falling back to copy", from.display(), to.display());
            copy_entry(&from, &to)?;
            remove_entry(&from)?;
        }
    }
    Ok(())
}

fn remove_entry(path: &Path) -> Result<(), StoreError> {
    let meta = path.symlink_metadata()?;
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Replace the `latest` symlink under `role_root` with one pointing at
/// `target`.
///
/// A link that does not exist yet is not an error; any other filesystem
/// error (e.g. permission denied) propagates.
pub fn update_latest_link(role_root: &Path, target: &Path) -> Result<(), StoreError> {
    let link = role_root.join(crate::LATEST_LINK_NAME);
    match link.symlink_metadata() {
        Ok(_) => fs::remove_file(&link)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    std::os::unix::fs::symlink(target, &link)?;
    Ok(())
}

/// Copy `src` to `dst`, creating parent directories of `dst` as needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), StoreError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    Ok(())
}
