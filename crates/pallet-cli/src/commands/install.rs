use super::{colorize_status, json_pretty, runtime_backend, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use pallet_core::{InstallConfig, Installer};
use pallet_runtime::ShellExecutor;
use std::path::Path;

pub fn run(config: InstallConfig, runtime: &str, archive: &Path, json: bool) -> Result<u8, String> {
    let installer = Installer::new(config, runtime_backend(runtime)?, Box::new(ShellExecutor::new()));

    let pb = if json {
        None
    } else {
        Some(spinner("installing package..."))
    };

    match installer.install(archive) {
        Ok(()) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "package installed");
            }
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "install failed");
            }
            return Err(e.to_string());
        }
    }

    if json {
        let payload = serde_json::json!({
            "archive": archive,
            "status": "installed"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}: {}", colorize_status("installed"), archive.display());
    }
    Ok(EXIT_SUCCESS)
}
