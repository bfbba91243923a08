use crate::package::Package;
use crate::CoreError;
use pallet_runtime::ImageRuntime;
use pallet_schema::{parse_manifest_file, MANIFEST_FILE_NAME};
use pallet_store::{
    compress_dir, copy_tree, create_unique_dir, move_tree, update_latest_link, BuildLayout,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Build pipeline: source tree → verified, staged, compressed archive.
///
/// Every build stages through a unique in-progress directory and ends with
/// a move into a terminal role directory (successful or failed), so a
/// failure at any step after staging leaves an inspectable artifact under
/// the failed root — never a half-written mix under in-progress.
pub struct Builder {
    layout: BuildLayout,
    runtime: Box<dyn ImageRuntime>,
}

impl Builder {
    pub fn new(build_root: impl Into<PathBuf>, runtime: Box<dyn ImageRuntime>) -> Self {
        Self {
            layout: BuildLayout::new(build_root),
            runtime,
        }
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Build the package rooted at `source_dir` and return the absolute
    /// path of the produced `<name>-<version>-<release>.tar.gz`.
    pub fn build(&self, source_dir: &Path) -> Result<PathBuf, CoreError> {
        info!("building package from {}", source_dir.display());

        // Parse failures abort before any staging side effects.
        let manifest = parse_manifest_file(source_dir.join(MANIFEST_FILE_NAME))?;
        let full_name = manifest.full_name();

        self.layout.ensure_roots()?;
        let failed_dir = create_unique_dir(&self.layout.failed_root(), &full_name)?;
        let inprogress = create_unique_dir(&self.layout.inprogress_root(), &full_name)?;

        copy_tree(source_dir, &inprogress)?;
        let package = Package::new(manifest, &inprogress);

        debug!("checking declared files");
        if let Err(e) = package.check_files_exist() {
            return self.demote(&inprogress, &failed_dir, e);
        }

        if let Err(e) = fs::create_dir_all(package.path().join("images")) {
            return self.demote(&inprogress, &failed_dir, e.into());
        }
        for image in &package.manifest.images {
            info!("exporting image {image}");
            if let Err(e) = self.runtime.export_image(image, &package.image_path(image)) {
                let err = CoreError::ImageExport {
                    image: image.full_name(),
                    source: e,
                };
                return self.demote(&inprogress, &failed_dir, err);
            }
        }

        debug!("compressing staged tree");
        let archive_name = format!("{full_name}.tar.gz");
        let data = match compress_dir(&inprogress) {
            Ok(d) => d,
            Err(e) => return self.demote(&inprogress, &failed_dir, e.into()),
        };
        if let Err(e) = fs::write(inprogress.join(&archive_name), &data) {
            return self.demote(&inprogress, &failed_dir, e.into());
        }

        let successful = create_unique_dir(&self.layout.successful_root(), &full_name)?;
        move_tree(&inprogress, &successful)?;
        update_latest_link(&self.layout.successful_root(), &successful)?;
        fs::remove_dir_all(&inprogress)?;

        info!("build of {full_name} promoted to {}", successful.display());
        Ok(successful.join(archive_name))
    }

    /// Uniform failure path for every step after staging: move the staged
    /// content into the failed directory, point the failed `latest` link at
    /// it, remove the emptied in-progress directory, and surface the
    /// original error.
    fn demote(
        &self,
        inprogress: &Path,
        failed_dir: &Path,
        err: CoreError,
    ) -> Result<PathBuf, CoreError> {
        warn!("build failed, demoting staged content: {err}");
        move_tree(inprogress, failed_dir)?;
        update_latest_link(&self.layout.failed_root(), failed_dir)?;
        fs::remove_dir_all(inprogress)?;
        Err(err)
    }
}
