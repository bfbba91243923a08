//! Installation mark files.
//!
//! A mark records "this package version is installed on this host". One
//! mark file per package name; a later install of the same name overwrites
//! the prior mark. Marks are written by the install pipeline and only read
//! back by external inspection tooling.

use crate::{fsync_dir, StoreError};
use pallet_schema::PackageManifest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MARK_EXTENSION: &str = "package";

/// Path of the mark file for a package name under `marks_dir`.
pub fn mark_path(marks_dir: &Path, name: &str) -> PathBuf {
    marks_dir.join(format!("{name}.{MARK_EXTENSION}"))
}

/// Write the installation mark for `manifest`, creating `marks_dir` if
/// absent. The write is atomic: content lands in a temp file first and is
/// renamed over any prior mark.
pub fn write_mark(marks_dir: &Path, manifest: &PackageManifest) -> Result<(), StoreError> {
    fs::create_dir_all(marks_dir)?;

    let content = format!(
        "name: {}\nversion: {}\nrelease: {}\nepoch: {}\n",
        manifest.name, manifest.version, manifest.release, manifest.epoch
    );

    let mut tmp = NamedTempFile::new_in(marks_dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(mark_path(marks_dir, &manifest.name))
        .map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(marks_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pallet_schema::parse_manifest_str;

    fn demo_manifest() -> PackageManifest {
        parse_manifest_str(
            r#"
name = "demo"
version = "1.0"
release = 2
epoch = "1"
"#,
        )
        .unwrap()
    }

    #[test]
    fn write_mark_creates_four_line_record() {
        let dir = tempfile::tempdir().unwrap();
        let marks = dir.path().join("marks");
        write_mark(&marks, &demo_manifest()).unwrap();

        let content = fs::read_to_string(mark_path(&marks, "demo")).unwrap();
        assert_eq!(content, "name: demo\nversion: 1.0\nrelease: 2\nepoch: 1\n");
    }

    #[test]
    fn write_mark_overwrites_prior_mark() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = demo_manifest();
        write_mark(dir.path(), &manifest).unwrap();

        manifest.version = "2.0".to_owned();
        manifest.release = 0;
        write_mark(dir.path(), &manifest).unwrap();

        let content = fs::read_to_string(mark_path(dir.path(), "demo")).unwrap();
        assert!(content.contains("version: 2.0"));
        assert!(content.contains("release: 0"));
    }

    #[test]
    fn write_mark_creates_marks_dir() {
        let dir = tempfile::tempdir().unwrap();
        let marks = dir.path().join("deep/marks/dir");
        write_mark(&marks, &demo_manifest()).unwrap();
        assert!(mark_path(&marks, "demo").exists());
    }

    #[test]
    fn marks_for_different_names_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = demo_manifest();
        write_mark(dir.path(), &manifest).unwrap();

        manifest.name = "other".to_owned();
        write_mark(dir.path(), &manifest).unwrap();

        assert!(mark_path(dir.path(), "demo").exists());
        assert!(mark_path(dir.path(), "other").exists());
    }
}
