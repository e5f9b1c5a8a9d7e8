use std::path::Path;

use mopy_core::{CONFIG_FILE_NAME, MopyConfig};

/// Write a starter mopy.toml in the current directory.
pub fn init_project(python: &str) -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists");
    }

    let content = format!(
        r#"# Python version, used as the python image tag
python = "{python}"

# PyPI specifiers, ./path/requirements.txt, local paths,
# git+https:// or git+ssh:// URLs
pip = []

# Extra apt packages for the builder stage
# apt = ["libpq-dev"]

# A single .py file, or a directory containing main.py
# project = "./main.py"

# [env]
# APP_MODE = "production"

# [labels]
# "org.opencontainers.image.title" = "my-app"
"#
    );

    // Reject a bad --python before anything touches disk.
    MopyConfig::parse(&content)?;

    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "created config");
    println!("Created {CONFIG_FILE_NAME}");
    Ok(())
}
