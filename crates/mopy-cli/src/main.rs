mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mopy_build::Arch;

#[derive(Parser)]
#[command(name = "mopy", about = "Generate multi-stage Dockerfiles for Python projects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a mopy.toml in the current directory
    Init {
        /// Python version written to the new mopy.toml
        #[arg(long, default_value = "3.12")]
        python: String,
    },
    /// Print the generated Dockerfile
    Generate {
        /// Path to the manifest (default: ./mopy.toml)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Target architecture: amd64, arm64, ... (default: this machine)
        #[arg(long)]
        arch: Option<Arch>,
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Write the Dockerfile next to mopy.toml for manual customization
    Eject {
        /// Path to the manifest (default: ./mopy.toml)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Target architecture: amd64, arm64, ... (default: this machine)
        #[arg(long)]
        arch: Option<Arch>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { python } => commands::init_project(&python)?,
        Commands::Generate { file, arch, output } => {
            commands::generate(file.as_deref(), arch, output.as_deref())?
        }
        Commands::Eject { file, arch } => commands::eject(file.as_deref(), arch)?,
    }

    Ok(())
}
