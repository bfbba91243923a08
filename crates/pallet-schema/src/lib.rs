//! Package manifest parsing and validation for Pallet.
//!
//! This crate defines the schema layer: the TOML manifest (`PackageManifest`)
//! describing a package's identity, declared host files, container images
//! (`ImageRef`), and install hooks, plus parse-time validation.

pub mod image;
pub mod manifest;

pub use image::ImageRef;
pub use manifest::{
    parse_manifest_file, parse_manifest_str, ManifestError, PackageManifest, MANIFEST_FILE_NAME,
};
