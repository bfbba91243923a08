use crate::package::Package;
use crate::CoreError;
use pallet_runtime::{ImageRuntime, ScriptExecutor};
use pallet_store::{copy_file, write_mark};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which install hook a script error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    PreInstall,
    PostInstall,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookStage::PreInstall => "pre-install",
            HookStage::PostInstall => "post-install",
        })
    }
}

/// Explicit installer configuration — no process-wide state.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Root the declared file paths are installed under. `/` on a real
    /// host; overridden in tests.
    pub install_root: PathBuf,
    /// Directory installation marks are written to.
    pub marks_dir: PathBuf,
    /// Where package archives are extracted while installing.
    pub work_root: PathBuf,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("/"),
            marks_dir: PathBuf::from("/etc/pallet"),
            work_root: std::env::temp_dir(),
        }
    }
}

/// Install pipeline: archive → running system state.
///
/// Strictly sequential; each step's failure aborts the remainder with a
/// step-tagged error. Completed steps are not rolled back — a failed
/// install may leave the host partially modified, and the caller decides
/// what to do with that.
pub struct Installer {
    config: InstallConfig,
    runtime: Box<dyn ImageRuntime>,
    executor: Box<dyn ScriptExecutor>,
}

impl Installer {
    pub fn new(
        config: InstallConfig,
        runtime: Box<dyn ImageRuntime>,
        executor: Box<dyn ScriptExecutor>,
    ) -> Self {
        Self {
            config,
            runtime,
            executor,
        }
    }

    pub fn install(&self, archive: &Path) -> Result<(), CoreError> {
        info!("installing package from {}", archive.display());
        let package = Package::from_archive(archive, &self.config.work_root)?;

        self.run_hook(&package, HookStage::PreInstall)?;

        for image in &package.manifest.images {
            info!("importing image {image}");
            self.runtime
                .import_image(&package.image_path(image))
                .map_err(|e| CoreError::ImageImport {
                    image: image.full_name(),
                    source: e,
                })?;
        }

        info!("installing files");
        self.backup_files(&package)?;
        self.install_files(&package)?;

        self.run_hook(&package, HookStage::PostInstall)?;

        info!("writing installation mark for {}", package.full_name());
        write_mark(&self.config.marks_dir, &package.manifest)?;

        debug!("cleaning extracted package at {}", package.path().display());
        package.clean()?;
        Ok(())
    }

    fn run_hook(&self, package: &Package, stage: HookStage) -> Result<(), CoreError> {
        let script = match stage {
            HookStage::PreInstall => package.manifest.preinstall.as_deref(),
            HookStage::PostInstall => package.manifest.postinstall.as_deref(),
        };
        // Absent or empty script is a no-op, not an error.
        let Some(script) = script else { return Ok(()) };
        if script.is_empty() {
            return Ok(());
        }

        info!("running {stage} script");
        let label = format!("{}-{stage}", package.full_name());
        let output = self
            .executor
            .run(script, &label)
            .map_err(|e| CoreError::Script { stage, source: e })?;
        if !output.is_empty() {
            debug!(
                "{stage} output: {}",
                String::from_utf8_lossy(&output).trim_end()
            );
        }
        Ok(())
    }

    /// Back up every pre-existing destination file to `<file>.old` before
    /// any installation begins. An absent destination is skipped; any
    /// other stat error fails the step.
    fn backup_files(&self, package: &Package) -> Result<(), CoreError> {
        for f in &package.manifest.files {
            let dst = self.config.install_root.join(f);
            match dst.metadata() {
                Ok(_) => {
                    debug!("backing up {}", dst.display());
                    copy_file(&dst, &with_old_suffix(&dst))?;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn install_files(&self, package: &Package) -> Result<(), CoreError> {
        for f in &package.manifest.files {
            let dst = self.config.install_root.join(f);
            debug!("installing {}", dst.display());
            copy_file(&package.file_source(f), &dst)?;
        }
        Ok(())
    }
}

fn with_old_suffix(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".old");
    PathBuf::from(s)
}
