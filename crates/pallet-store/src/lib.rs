//! Staging layout, filesystem operations, archive codec, and installation
//! marks for Pallet.
//!
//! This crate provides the storage layer: `BuildLayout` for the
//! in-progress/successful/failed staging roots and their `latest` links,
//! native filesystem primitives (`copy_tree`, `move_tree`,
//! `create_unique_dir`, `update_latest_link`), a deterministic tar+gzip
//! archive codec, and installation mark files.

pub mod archive;
pub mod fsops;
pub mod layout;
pub mod marks;

pub use archive::{compress_dir, extract_archive};
pub use fsops::{
    copy_file, copy_tree, create_unique_dir, ensure_dir, move_tree, update_latest_link,
};
pub use layout::{BuildLayout, BuildRole, LATEST_LINK_NAME};
pub use marks::{mark_path, write_mark};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee this.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("destination directory does not exist: {0}")]
    MissingDestination(String),
}
