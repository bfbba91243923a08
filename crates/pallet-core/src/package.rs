use crate::CoreError;
use pallet_schema::{parse_manifest_file, ImageRef, PackageManifest, MANIFEST_FILE_NAME};
use pallet_store::{create_unique_dir, ensure_dir, extract_archive};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A manifest bound to a working directory on disk.
///
/// The working path is set exactly once — when the package is staged by a
/// build or extracted from an archive — and every file or image operation
/// resolves against it. [`clean`](Self::clean) removes the directory and
/// conceptually ends the package's life.
pub struct Package {
    pub manifest: PackageManifest,
    path: PathBuf,
}

impl Package {
    pub fn new(manifest: PackageManifest, path: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            path: path.into(),
        }
    }

    /// Extract `archive` into a fresh unique directory under `work_root`
    /// and load the manifest it contains.
    pub fn from_archive(archive: &Path, work_root: &Path) -> Result<Self, CoreError> {
        let base = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_owned());

        ensure_dir(work_root)?;
        let dst = create_unique_dir(work_root, &base)?;
        debug!("extracting {} to {}", archive.display(), dst.display());

        if let Err(e) = extract_archive(archive, &dst) {
            let _ = fs::remove_dir_all(&dst);
            return Err(CoreError::PackageLoad(format!(
                "failed to extract {}: {e}",
                archive.display()
            )));
        }

        match parse_manifest_file(dst.join(MANIFEST_FILE_NAME)) {
            Ok(manifest) => Ok(Self::new(manifest, dst)),
            Err(e) => {
                let _ = fs::remove_dir_all(&dst);
                Err(e.into())
            }
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn full_name(&self) -> String {
        self.manifest.full_name()
    }

    /// Location of a declared file inside the package tree.
    pub fn file_source(&self, file: &str) -> PathBuf {
        self.path.join("files").join(file)
    }

    /// Absolute location of an image's serialized archive.
    pub fn image_path(&self, image: &ImageRef) -> PathBuf {
        self.path.join(&image.path)
    }

    /// Verify every declared file exists under `files/` in the package
    /// tree. Returns the first missing file in declaration order.
    pub fn check_files_exist(&self) -> Result<(), CoreError> {
        for f in &self.manifest.files {
            match self.file_source(f).metadata() {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(CoreError::MissingFile(f.clone()));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Remove the package's working directory. Idempotent: an already
    /// absent directory is not an error.
    pub fn clean(&self) -> Result<(), CoreError> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pallet_schema::parse_manifest_str;

    fn demo_manifest(files: &[&str]) -> PackageManifest {
        let list: Vec<String> = files.iter().map(|f| format!("\"{f}\"")).collect();
        parse_manifest_str(&format!(
            r#"
name = "demo"
version = "1.0"
release = 2
files = [{}]
"#,
            list.join(", ")
        ))
        .unwrap()
    }

    #[test]
    fn check_files_exist_passes_when_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("files/etc")).unwrap();
        fs::write(dir.path().join("files/etc/demo.conf"), "conf").unwrap();

        let package = Package::new(demo_manifest(&["etc/demo.conf"]), dir.path());
        package.check_files_exist().unwrap();
    }

    #[test]
    fn check_files_exist_reports_first_missing_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("files")).unwrap();
        fs::write(dir.path().join("files/present.txt"), "x").unwrap();

        let package = Package::new(
            demo_manifest(&["present.txt", "first-missing.txt", "second-missing.txt"]),
            dir.path(),
        );
        match package.check_files_exist() {
            Err(CoreError::MissingFile(f)) => assert_eq!(f, "first-missing.txt"),
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }

    #[test]
    fn clean_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let work = base.path().join("pkg");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join("junk"), "x").unwrap();

        let package = Package::new(demo_manifest(&[]), &work);
        package.clean().unwrap();
        assert!(!work.exists());
        package.clean().unwrap();
    }

    #[test]
    fn image_path_joins_working_dir() {
        let package = Package::new(demo_manifest(&[]), "/work/demo-1.0-2");
        let img = ImageRef {
            repo: "demo".to_owned(),
            tag: "v1".to_owned(),
            path: "images/demo.tar".to_owned(),
        };
        assert_eq!(
            package.image_path(&img),
            PathBuf::from("/work/demo-1.0-2/images/demo.tar")
        );
    }

    #[test]
    fn from_archive_extracts_and_parses() {
        let src = tempfile::tempdir().unwrap();
        fs::write(
            src.path().join(MANIFEST_FILE_NAME),
            "name = \"demo\"\nversion = \"1.0\"\nrelease = 2\n",
        )
        .unwrap();
        fs::create_dir_all(src.path().join("files")).unwrap();

        let data = pallet_store::compress_dir(src.path()).unwrap();
        let base = tempfile::tempdir().unwrap();
        let ar_path = base.path().join("demo-1.0-2.tar.gz");
        fs::write(&ar_path, &data).unwrap();

        let work = base.path().join("work");
        let package = Package::from_archive(&ar_path, &work).unwrap();
        assert_eq!(package.full_name(), "demo-1.0-2");
        assert!(package.path().join(MANIFEST_FILE_NAME).exists());
        package.clean().unwrap();
    }

    #[test]
    fn from_archive_rejects_garbage() {
        let base = tempfile::tempdir().unwrap();
        let ar_path = base.path().join("broken.tar.gz");
        fs::write(&ar_path, b"not an archive").unwrap();

        let work = base.path().join("work");
        let result = Package::from_archive(&ar_path, &work);
        assert!(matches!(result, Err(CoreError::PackageLoad(_))));
    }

    #[test]
    fn from_archive_without_manifest_fails_and_cleans_up() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("stray.txt"), "no manifest here").unwrap();

        let data = pallet_store::compress_dir(src.path()).unwrap();
        let base = tempfile::tempdir().unwrap();
        let ar_path = base.path().join("bad.tar.gz");
        fs::write(&ar_path, &data).unwrap();

        let work = base.path().join("work");
        let result = Package::from_archive(&ar_path, &work);
        assert!(matches!(result, Err(CoreError::Manifest(_))));

        // The extraction directory must not be left behind.
        let leftovers: Vec<_> = fs::read_dir(&work).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn from_archive_with_invalid_manifest_cleans_up() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join(MANIFEST_FILE_NAME), "not = valid = toml").unwrap();

        let data = pallet_store::compress_dir(src.path()).unwrap();
        let base = tempfile::tempdir().unwrap();
        let ar_path = base.path().join("bad.tar.gz");
        fs::write(&ar_path, &data).unwrap();

        let work = base.path().join("work");
        assert!(Package::from_archive(&ar_path, &work).is_err());
        let leftovers: Vec<_> = fs::read_dir(&work).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
