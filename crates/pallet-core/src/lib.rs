//! Build and install pipelines for Pallet packages.
//!
//! This crate ties together manifest parsing, staging transitions, and the
//! runtime collaborators into the two pipeline entry points: `Builder`
//! (source tree → verified, staged, compressed archive with failure
//! demotion) and `Installer` (archive → running system state with hooks,
//! file backups, and an installation mark).

pub mod builder;
pub mod installer;
pub mod package;

pub use builder::Builder;
pub use installer::{HookStage, InstallConfig, Installer};
pub use package::Package;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] pallet_schema::ManifestError),
    #[error("store error: {0}")]
    Store(#[from] pallet_store::StoreError),
    #[error("runtime error: {0}")]
    Runtime(#[from] pallet_runtime::RuntimeError),
    #[error("file '{0}' is declared but missing")]
    MissingFile(String),
    #[error("error exporting image {image}: {source}")]
    ImageExport {
        image: String,
        source: pallet_runtime::RuntimeError,
    },
    #[error("error importing image {image}: {source}")]
    ImageImport {
        image: String,
        source: pallet_runtime::RuntimeError,
    },
    #[error("error running the {stage} script: {source}")]
    Script {
        stage: HookStage,
        source: pallet_runtime::RuntimeError,
    },
    #[error("failed to load package: {0}")]
    PackageLoad(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
