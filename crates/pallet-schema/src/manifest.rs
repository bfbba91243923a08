use crate::image::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Manifest file name at the root of every package source tree and archive.
pub const MANIFEST_FILE_NAME: &str = "pallet.toml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("failed to serialize manifest: {0}")]
    SerializeToml(#[from] toml::ser::Error),
    #[error("package name must not be empty")]
    EmptyName,
    #[error("declared file path must be relative: '{0}'")]
    AbsoluteFilePath(String),
    #[error("image path must be relative: '{0}' (image {1})")]
    AbsoluteImagePath(String, String),
}

/// The declarative record describing a package: identity, host files,
/// container images, and install hooks.
///
/// Declaration order of `files` and `images` is significant — the pipelines
/// process both in order and report the first failure.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub release: u32,
    #[serde(default)]
    pub maintainer: String,
    #[serde(default)]
    pub epoch: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub changelog: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preinstall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postinstall: Option<String>,
}

impl PackageManifest {
    /// Canonical `name-version-release` base name used for archives and
    /// staging directories.
    pub fn full_name(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.release)
    }

    /// Human-readable summary block for informational display.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Package: {}", self.name);
        let _ = writeln!(out, "Version: {}-{}", self.version, self.release);
        let _ = writeln!(out, "Maintainer: {}", self.maintainer);
        let _ = writeln!(out, "Description: {}", self.description);
        let _ = writeln!(out, "Changelog: {}", self.changelog);
        out
    }

    /// Serialize back to TOML. Round-trips through [`parse_manifest_str`]
    /// for every field the pipelines consume.
    pub fn to_toml(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(ManifestError::EmptyName);
        }
        for f in &self.files {
            if Path::new(f).is_absolute() {
                return Err(ManifestError::AbsoluteFilePath(f.clone()));
            }
        }
        for img in &self.images {
            if Path::new(&img.path).is_absolute() {
                return Err(ManifestError::AbsoluteImagePath(
                    img.path.clone(),
                    img.full_name(),
                ));
            }
        }
        Ok(())
    }
}

pub fn parse_manifest_str(input: &str) -> Result<PackageManifest, ManifestError> {
    let mut manifest: PackageManifest = toml::from_str(input)?;
    manifest.description = manifest.description.trim().to_owned();
    manifest.changelog = manifest.changelog.trim().to_owned();
    manifest.validate()?;
    Ok(manifest)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<PackageManifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
