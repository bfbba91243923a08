//! Deterministic tar+gzip codec for package archives.
//!
//! Regular files, directories, and symlinks are supported. Determinism
//! guarantees for [`compress_dir`]:
//! - Entries sorted lexicographically by relative path
//! - All timestamps set to 0 (Unix epoch)
//! - All ownership set to 0:0 (root:root)
//! - Permissions preserved as-is from source

use crate::StoreError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Create a gzip-compressed tar archive of the contents of `source_dir`.
pub fn compress_dir(source_dir: &Path) -> Result<Vec<u8>, StoreError> {
    let mut entries = collect_entries(source_dir, source_dir)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut ar = tar::Builder::new(encoder);
    ar.follow_symlinks(false);

    for (rel_path, full_path) in &entries {
        let ft = match full_path.symlink_metadata() {
            Ok(m) => m.file_type(),
            Err(e) => {
                warn!("skipping {}: metadata error: {e}", rel_path);
                continue;
            }
        };

        if ft.is_file() {
            append_file(&mut ar, rel_path, full_path)?;
        } else if ft.is_dir() {
            append_dir(&mut ar, rel_path, full_path)?;
        } else if ft.is_symlink() {
            append_symlink(&mut ar, rel_path, full_path)?;
        } else {
            warn!("skipping unsupported file type: {rel_path}");
        }
    }

    let encoder = ar.into_inner()?;
    let data = encoder.finish()?;
    Ok(data)
}

/// Extract a gzip-compressed tar archive into `target_dir`, creating it if
/// absent.
pub fn extract_archive(archive_path: &Path, target_dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(target_dir)?;
    let file = fs::File::open(archive_path)?;
    let mut ar = tar::Archive::new(GzDecoder::new(file));
    ar.set_preserve_permissions(true);
    ar.set_preserve_mtime(false);
    ar.set_unpack_xattrs(false);
    ar.unpack(target_dir)?;
    Ok(())
}

/// Recursively collect (relative_path, full_path) pairs from a directory tree.
fn collect_entries(root: &Path, current: &Path) -> Result<Vec<(String, PathBuf)>, StoreError> {
    let mut result = Vec::new();
    if !current.exists() {
        return Ok(result);
    }
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let full = entry.path();
        let rel = full
            .strip_prefix(root)
            .map_err(|e| StoreError::Io(std::io::Error::other(format!("path strip: {e}"))))?
            .to_string_lossy()
            .to_string();

        let meta = full.symlink_metadata()?;
        if meta.is_dir() {
            result.push((rel.clone(), full.clone()));
            result.extend(collect_entries(root, &full)?);
        } else {
            result.push((rel, full));
        }
    }
    Ok(result)
}

type GzBuilder = tar::Builder<GzEncoder<Vec<u8>>>;

fn make_header(full_path: &Path, entry_type: tar::EntryType) -> Result<tar::Header, StoreError> {
    let meta = full_path.symlink_metadata()?;
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mode(meta.permissions().mode());
    Ok(header)
}

fn append_file(ar: &mut GzBuilder, rel_path: &str, full_path: &Path) -> Result<(), StoreError> {
    let data = fs::read(full_path)?;
    let mut header = make_header(full_path, tar::EntryType::Regular)?;
    header.set_size(data.len() as u64);
    header.set_cksum();
    ar.append_data(&mut header, rel_path, data.as_slice())?;
    Ok(())
}

fn append_dir(ar: &mut GzBuilder, rel_path: &str, full_path: &Path) -> Result<(), StoreError> {
    let mut header = make_header(full_path, tar::EntryType::Directory)?;
    header.set_size(0);
    header.set_cksum();
    let path = if rel_path.ends_with('/') {
        rel_path.to_owned()
    } else {
        format!("{rel_path}/")
    };
    ar.append_data(&mut header, &path, &[] as &[u8])?;
    Ok(())
}

fn append_symlink(ar: &mut GzBuilder, rel_path: &str, full_path: &Path) -> Result<(), StoreError> {
    let target = fs::read_link(full_path)?;
    let mut header = make_header(full_path, tar::EntryType::Symlink)?;
    header.set_size(0);
    header.set_cksum();
    ar.append_link(&mut header, rel_path, &target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_fixture_dir(dir: &Path) {
        fs::write(dir.join("pallet.toml"), "name = \"demo\"").unwrap();
        fs::write(dir.join("binary.bin"), [0u8, 1, 2, 255]).unwrap();

        fs::create_dir_all(dir.join("files").join("etc")).unwrap();
        fs::write(dir.join("files/etc/demo.conf"), "demo config").unwrap();

        fs::create_dir_all(dir.join("images")).unwrap();
        fs::write(dir.join("images/demo.tar"), "fake image bytes").unwrap();

        std::os::unix::fs::symlink("pallet.toml", dir.join("link_to_manifest")).unwrap();
    }

    #[test]
    fn compress_extract_roundtrip() {
        let src = tempfile::tempdir().unwrap();
        create_fixture_dir(src.path());

        let data = compress_dir(src.path()).unwrap();
        assert!(!data.is_empty());

        let ar_dir = tempfile::tempdir().unwrap();
        let ar_path = ar_dir.path().join("demo-1.0-2.tar.gz");
        fs::write(&ar_path, &data).unwrap();

        let dst = tempfile::tempdir().unwrap();
        extract_archive(&ar_path, dst.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dst.path().join("files/etc/demo.conf")).unwrap(),
            "demo config"
        );
        assert_eq!(
            fs::read(dst.path().join("binary.bin")).unwrap(),
            &[0u8, 1, 2, 255]
        );
        assert_eq!(
            fs::read_to_string(dst.path().join("images/demo.tar")).unwrap(),
            "fake image bytes"
        );
        let link = dst.path().join("link_to_manifest");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn compress_is_deterministic() {
        let src = tempfile::tempdir().unwrap();
        create_fixture_dir(src.path());

        let a = compress_dir(src.path()).unwrap();
        let b = compress_dir(src.path()).unwrap();
        assert_eq!(a, b, "compress_dir must be deterministic");
    }

    #[test]
    fn compress_empty_dir() {
        let src = tempfile::tempdir().unwrap();
        let data = compress_dir(src.path()).unwrap();

        let ar_dir = tempfile::tempdir().unwrap();
        let ar_path = ar_dir.path().join("empty.tar.gz");
        fs::write(&ar_path, &data).unwrap();

        let dst = tempfile::tempdir().unwrap();
        extract_archive(&ar_path, dst.path()).unwrap();
    }

    #[test]
    fn extract_creates_missing_target() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("f.txt"), "data").unwrap();
        let data = compress_dir(src.path()).unwrap();

        let base = tempfile::tempdir().unwrap();
        let ar_path = base.path().join("a.tar.gz");
        fs::write(&ar_path, &data).unwrap();

        let target = base.path().join("extract/here");
        assert!(!target.exists());
        extract_archive(&ar_path, &target).unwrap();
        assert!(target.join("f.txt").exists());
    }

    #[test]
    fn extract_garbage_fails() {
        let base = tempfile::tempdir().unwrap();
        let ar_path = base.path().join("garbage.tar.gz");
        fs::write(&ar_path, b"this is not a gzip stream").unwrap();

        let dst = tempfile::tempdir().unwrap();
        assert!(extract_archive(&ar_path, dst.path()).is_err());
    }

    #[test]
    fn extract_missing_archive_fails() {
        let base = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let result = extract_archive(&base.path().join("nope.tar.gz"), dst.path());
        assert!(result.is_err());
    }
}
