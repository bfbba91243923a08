use crate::backend::ImageRuntime;
use crate::RuntimeError;
use pallet_schema::ImageRef;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory runtime for pipeline tests.
///
/// Records every export/import behind a shared mutex — clones observe the
/// same history, so a test can keep a probe handle while the pipeline owns
/// the boxed runtime. Writes recognizable fake image bytes at export
/// destinations so built archives carry real content. Failure injection
/// targets one image name or file name.
#[derive(Clone, Default)]
pub struct MockRuntime {
    exported: Arc<Mutex<Vec<String>>>,
    imported: Arc<Mutex<Vec<PathBuf>>>,
    fail_export_of: Option<String>,
    fail_import_of: Option<String>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the export of the image whose `repo:tag` equals `full_name`.
    pub fn failing_export(full_name: impl Into<String>) -> Self {
        Self {
            fail_export_of: Some(full_name.into()),
            ..Self::default()
        }
    }

    /// Fail the import of any archive whose file name equals `file_name`.
    pub fn failing_import(file_name: impl Into<String>) -> Self {
        Self {
            fail_import_of: Some(file_name.into()),
            ..Self::default()
        }
    }

    pub fn exported(&self) -> Vec<String> {
        self.exported.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn imported(&self) -> Vec<PathBuf> {
        self.imported.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl ImageRuntime for MockRuntime {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn available(&self) -> bool {
        true
    }

    fn export_image(&self, image: &ImageRef, dest: &Path) -> Result<(), RuntimeError> {
        if self.fail_export_of.as_deref() == Some(image.full_name().as_str()) {
            return Err(RuntimeError::ExportFailed {
                image: image.full_name(),
                detail: "injected export failure".to_owned(),
            });
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, format!("mock-image:{}\n", image.full_name()))?;

        let mut exported = self
            .exported
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))?;
        exported.push(image.full_name());
        Ok(())
    }

    fn import_image(&self, archive: &Path) -> Result<(), RuntimeError> {
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_import_of.as_deref() == Some(file_name.as_str()) {
            return Err(RuntimeError::ImportFailed {
                path: archive.display().to_string(),
                detail: "injected import failure".to_owned(),
            });
        }
        if !archive.exists() {
            return Err(RuntimeError::ImportFailed {
                path: archive.display().to_string(),
                detail: "image file does not exist".to_owned(),
            });
        }

        let mut imported = self
            .imported
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))?;
        imported.push(archive.to_path_buf());
        Ok(())
    }
}
