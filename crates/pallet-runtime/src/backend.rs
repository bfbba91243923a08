use crate::RuntimeError;
use pallet_schema::ImageRef;
use std::path::Path;

/// Container runtime collaborator: exports images into package archives at
/// build time and loads them back at install time.
///
/// The runtime is invoked as an opaque service — one blocking call per
/// image, no retries. Failure of a single call is definitive.
pub trait ImageRuntime: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    /// Serialize `image` into the file at `dest`.
    fn export_image(&self, image: &ImageRef, dest: &Path) -> Result<(), RuntimeError>;

    /// Load the serialized image stored at `archive` into the runtime.
    fn import_image(&self, archive: &Path) -> Result<(), RuntimeError>;
}

pub fn select_runtime(name: &str) -> Result<Box<dyn ImageRuntime>, RuntimeError> {
    match name {
        "docker" => Ok(Box::new(crate::docker::DockerCli::new())),
        "mock" => Ok(Box::new(crate::mock::MockRuntime::new())),
        other => Err(RuntimeError::BackendUnavailable(other.to_owned())),
    }
}
