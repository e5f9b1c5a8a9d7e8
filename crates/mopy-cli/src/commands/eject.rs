use std::path::Path;

use mopy_build::Arch;

pub fn eject(file: Option<&Path>, arch: Option<Arch>) -> anyhow::Result<()> {
    let (config, project_dir) = super::load_config(file)?;
    let dockerfile = super::render(&config, arch);

    let path = mopy_build::eject::eject(&project_dir, &dockerfile)?;

    println!("Ejected Dockerfile to {}", path.display());
    println!("Build it with: docker buildx build --ssh default .");
    Ok(())
}
