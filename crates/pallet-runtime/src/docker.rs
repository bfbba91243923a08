use crate::backend::ImageRuntime;
use crate::RuntimeError;
use pallet_schema::ImageRef;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Docker CLI backend.
///
/// Shells out to `docker save` / `docker load` and folds the captured
/// combined output into the error on failure.
pub struct DockerCli {
    bin: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            bin: "docker".to_owned(),
        }
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an alternative binary (e.g. `podman`, which is CLI-compatible).
    pub fn with_bin(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

fn combined_output(output: &std::process::Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_owned()
}

impl ImageRuntime for DockerCli {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn available(&self) -> bool {
        Command::new(&self.bin)
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn export_image(&self, image: &ImageRef, dest: &Path) -> Result<(), RuntimeError> {
        debug!("docker save {} -> {}", image.full_name(), dest.display());
        let output = Command::new(&self.bin)
            .arg("save")
            .arg("-o")
            .arg(dest)
            .arg(image.full_name())
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RuntimeError::ExportFailed {
                image: image.full_name(),
                detail: combined_output(&output),
            })
        }
    }

    fn import_image(&self, archive: &Path) -> Result<(), RuntimeError> {
        debug!("docker load -i {}", archive.display());
        let output = Command::new(&self.bin)
            .arg("load")
            .arg("-i")
            .arg(archive)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RuntimeError::ImportFailed {
                path: archive.display().to_string(),
                detail: combined_output(&output),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_unavailable() {
        let cli = DockerCli::with_bin("definitely-not-a-real-docker-binary");
        assert!(!cli.available());
    }

    #[test]
    fn export_with_missing_binary_fails() {
        let cli = DockerCli::with_bin("definitely-not-a-real-docker-binary");
        let image = ImageRef {
            repo: "demo".to_owned(),
            tag: "v1".to_owned(),
            path: "images/demo.tar".to_owned(),
        };
        let dir = tempfile::tempdir().unwrap();
        let result = cli.export_image(&image, &dir.path().join("demo.tar"));
        assert!(result.is_err());
    }

    #[test]
    fn name_is_docker() {
        assert_eq!(DockerCli::new().name(), "docker");
    }
}
