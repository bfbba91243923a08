mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_STORE_ERROR};
use pallet_core::InstallConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pallet",
    version,
    about = "Package manager for container applications"
)]
struct Cli {
    /// Path to the build staging directory.
    #[arg(long, default_value = "~/.local/share/pallet/builds", global = true)]
    builds: String,

    /// Container runtime backend (docker, mock).
    #[arg(long, default_value = "docker", global = true)]
    runtime: String,

    /// Root directory declared files are installed under.
    #[arg(long, default_value = "/", global = true)]
    root: PathBuf,

    /// Directory installation marks are written to.
    #[arg(long, default_value = "/etc/pallet", global = true)]
    marks_dir: PathBuf,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a package archive from a source directory.
    Build {
        /// Directory containing pallet.toml and the files/ tree.
        #[arg(default_value = ".")]
        source: PathBuf,
    },
    /// Install a built package archive onto this system.
    Install {
        /// Path to a <name>-<version>-<release>.tar.gz archive.
        archive: PathBuf,
    },
    /// Show the manifest summary of a package archive.
    Info {
        /// Path to a <name>-<version>-<release>.tar.gz archive.
        archive: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PALLET_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let builds = expand_tilde(&cli.builds);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Build { source } => {
            commands::build::run(&builds, &cli.runtime, &source, json_output)
        }
        Commands::Install { archive } => {
            let config = InstallConfig {
                install_root: cli.root,
                marks_dir: cli.marks_dir,
                ..InstallConfig::default()
            };
            commands::install::run(config, &cli.runtime, &archive, json_output)
        }
        Commands::Info { archive } => commands::info::run(&archive, json_output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:") {
                EXIT_MANIFEST_ERROR
            } else if msg.starts_with("store error:") {
                EXIT_STORE_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
