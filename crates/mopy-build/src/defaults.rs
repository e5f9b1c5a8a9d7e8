use std::collections::BTreeMap;

/// Tables the generator merges caller overrides into.
///
/// Passed to [`DockerfileGenerator`](crate::DockerfileGenerator) explicitly;
/// `Default` holds the values mopy ships with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDefaults {
    /// Environment of the builder stage.
    pub build_env: BTreeMap<String, String>,
    /// Environment of the runtime stage.
    pub run_env: BTreeMap<String, String>,
    /// Labels of the final image.
    pub labels: BTreeMap<String, String>,
    /// Packages forced into the builder when HTTP or SSH dependencies exist.
    pub vcs_packages: Vec<String>,
    /// Module run when the project is a directory.
    pub entry_module: String,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self {
            build_env: table(&[
                ("PIP_DISABLE_PIP_VERSION_CHECK", "1"),
                ("PIP_NO_WARN_SCRIPT_LOCATION", "0"),
                ("PIP_USER", "1"),
                ("PYTHONPYCACHEPREFIX", "$HOME/.pycache"),
                ("GIT_SSH_COMMAND", "ssh -o StrictHostKeyChecking=no"),
            ]),
            run_env: table(&[("PYTHONUNBUFFERED", "1")]),
            labels: table(&[
                (
                    "org.opencontainers.image.description",
                    "autogenerated by mopy",
                ),
                ("moby.buildkit.frontend", "mopy"),
                ("mopy.version", "v1"),
            ]),
            vcs_packages: vec!["git-lfs".to_owned()],
            entry_module: "main.py".to_owned(),
        }
    }
}

fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
