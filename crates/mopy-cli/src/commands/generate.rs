use std::path::Path;

use mopy_build::Arch;

pub fn generate(
    file: Option<&Path>,
    arch: Option<Arch>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (config, _) = super::load_config(file)?;
    let dockerfile = super::render(&config, arch);

    match output {
        Some(path) => {
            mopy_build::eject::write_dockerfile(path, &dockerfile)?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{dockerfile}"),
    }
    Ok(())
}
