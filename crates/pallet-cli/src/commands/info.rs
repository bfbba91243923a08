use super::{json_pretty, EXIT_SUCCESS};
use pallet_core::Package;
use std::path::Path;

pub fn run(archive: &Path, json: bool) -> Result<u8, String> {
    let work = std::env::temp_dir();
    let package = Package::from_archive(archive, &work).map_err(|e| e.to_string())?;

    let output = if json {
        let m = &package.manifest;
        let payload = serde_json::json!({
            "name": m.name,
            "version": m.version,
            "release": m.release,
            "epoch": m.epoch,
            "maintainer": m.maintainer,
            "description": m.description,
            "changelog": m.changelog,
            "files": m.files,
            "images": m.images.iter().map(|i| i.full_name()).collect::<Vec<_>>(),
        });
        json_pretty(&payload)
    } else {
        Ok(package.manifest.summary())
    };

    // Clean the extraction even when serialization failed.
    package.clean().map_err(|e| e.to_string())?;
    println!("{}", output?);
    Ok(EXIT_SUCCESS)
}
