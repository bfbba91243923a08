//! Runtime collaborators for Pallet packages.
//!
//! This crate implements the external-process layer: the `ImageRuntime`
//! trait for exporting and importing container images (Docker CLI backend
//! plus a mock for tests) and the `ScriptExecutor` trait for running
//! pre/post-install hook scripts with captured output.

pub mod backend;
pub mod docker;
pub mod mock;
pub mod script;

pub use backend::{select_runtime, ImageRuntime};
pub use docker::DockerCli;
pub use mock::MockRuntime;
pub use script::{MockExecutor, ScriptExecutor, ShellExecutor};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("runtime '{0}' is not available on this system")]
    BackendUnavailable(String),
    #[error("failed to export image {image}: {detail}")]
    ExportFailed { image: String, detail: String },
    #[error("failed to import image file {path}: {detail}")]
    ImportFailed { path: String, detail: String },
    #[error("script failed with {status}: {output}")]
    ScriptFailed { status: String, output: String },
    #[error("runtime execution failed: {0}")]
    ExecFailed(String),
}
