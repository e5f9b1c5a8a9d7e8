use std::path::{Path, PathBuf};

/// File name the Dockerfile is ejected to.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Writes the generated Dockerfile next to `mopy.toml`.
///
/// Refuses to overwrite an existing Dockerfile so hand edits survive a
/// second run.
pub fn eject(project_dir: &Path, dockerfile_content: &str) -> Result<PathBuf, EjectError> {
    let dockerfile_path = project_dir.join(DOCKERFILE_NAME);
    if is_ejected(project_dir) {
        return Err(EjectError::AlreadyEjected(dockerfile_path));
    }

    write_dockerfile(&dockerfile_path, dockerfile_content)?;
    Ok(dockerfile_path)
}

/// Check if the project already has a Dockerfile.
pub fn is_ejected(project_dir: &Path) -> bool {
    project_dir.join(DOCKERFILE_NAME).exists()
}

/// Write Dockerfile content to an explicit path, replacing any existing file.
pub fn write_dockerfile(path: &Path, dockerfile_content: &str) -> Result<(), EjectError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EjectError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, dockerfile_content).map_err(|e| EjectError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), bytes = dockerfile_content.len(), "wrote Dockerfile");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Dockerfile already exists at {0}; edit it directly or delete it to re-eject")]
    AlreadyEjected(PathBuf),
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
