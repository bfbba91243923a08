use super::{colorize_status, json_pretty, runtime_backend, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use pallet_core::Builder;
use std::path::Path;

pub fn run(builds: &Path, runtime: &str, source: &Path, json: bool) -> Result<u8, String> {
    let builder = Builder::new(builds, runtime_backend(runtime)?);

    let pb = if json {
        None
    } else {
        Some(spinner("building package..."))
    };

    let archive = match builder.build(source) {
        Ok(path) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "package built");
            }
            path
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "build failed");
            }
            return Err(e.to_string());
        }
    };

    if json {
        let payload = serde_json::json!({
            "archive": archive,
            "status": "built"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}: {}", colorize_status("built"), archive.display());
    }
    Ok(EXIT_SUCCESS)
}
