mod eject;
mod generate;
mod init;

use std::path::{Path, PathBuf};

use mopy_build::{Arch, DockerfileGenerator};
use mopy_core::{CONFIG_FILE_NAME, MopyConfig};

pub use eject::eject;
pub use generate::generate;
pub use init::init_project;

/// Load and validate the manifest, returning it with the directory it lives in.
pub(crate) fn load_config(file: Option<&Path>) -> anyhow::Result<(MopyConfig, PathBuf)> {
    let path = file.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);
    let config = MopyConfig::from_file(&path)?;
    let project_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((config, project_dir))
}

pub(crate) fn render(config: &MopyConfig, arch: Option<Arch>) -> String {
    let arch = arch.unwrap_or_else(Arch::host);
    tracing::debug!(%arch, "rendering Dockerfile");
    DockerfileGenerator::new(config, arch).render()
}
