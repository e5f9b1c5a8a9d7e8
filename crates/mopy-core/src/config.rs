use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dependency::DependencyKind;
use crate::error::Error;

/// File name looked up by [`MopyConfig::load`].
pub const CONFIG_FILE_NAME: &str = "mopy.toml";

/// mopy.toml configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MopyConfig {
    /// Python interpreter version, used as the `python` image tag
    #[serde(rename = "python", default = "default_python_version")]
    pub python_version: String,
    /// Dependency declarations: PyPI specifiers, URLs, or local paths
    #[serde(default)]
    pub pip: Vec<String>,
    /// Additional system packages installed in the builder via apt-get
    #[serde(default)]
    pub apt: Vec<String>,
    /// Environment variables for both stages; override the built-in defaults.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Image labels; override the built-in provenance labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Entry point: a single `.py` file or a directory containing `main.py`.
    #[serde(default)]
    pub project: Option<String>,
}

impl Default for MopyConfig {
    fn default() -> Self {
        Self {
            python_version: default_python_version(),
            pip: Vec::new(),
            apt: Vec::new(),
            env: BTreeMap::new(),
            labels: BTreeMap::new(),
            project: None,
        }
    }
}

impl MopyConfig {
    /// Load and validate `mopy.toml` from the given project directory.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        Self::from_file(&project_dir.join(CONFIG_FILE_NAME))
    }

    /// Load and validate a manifest at an explicit path.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            python = %config.python_version,
            dependencies = config.pip.len(),
            "loaded mopy config"
        );
        Ok(config)
    }

    /// Parse and validate a manifest from a string.
    pub fn parse(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParseStr { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against what the Dockerfile generator assumes.
    pub fn validate(&self) -> crate::Result<()> {
        if !is_valid_python_version(&self.python_version) {
            return Err(Error::InvalidPythonVersion {
                version: self.python_version.clone(),
            });
        }

        for (index, dep) in self.pip.iter().enumerate() {
            validate_dependency(index, dep)?;
        }

        for package in &self.apt {
            if package.is_empty() {
                return Err(Error::InvalidAptPackage {
                    value: package.clone(),
                    reason: "must not be empty",
                });
            }
            if package.chars().any(char::is_whitespace) {
                return Err(Error::InvalidAptPackage {
                    value: package.clone(),
                    reason: "must not contain whitespace",
                });
            }
        }

        for (key, value) in &self.env {
            if let Some(reason) = invalid_key_reason(key) {
                return Err(Error::InvalidEnvKey {
                    key: key.clone(),
                    reason,
                });
            }
            if has_line_break(value) {
                return Err(Error::InvalidEnvValue {
                    key: key.clone(),
                    reason: "must not contain line breaks",
                });
            }
        }

        for (key, value) in &self.labels {
            if let Some(reason) = invalid_key_reason(key) {
                return Err(Error::InvalidLabelKey {
                    key: key.clone(),
                    reason,
                });
            }
            if has_line_break(value) {
                return Err(Error::InvalidLabelValue {
                    key: key.clone(),
                    reason: "must not contain line breaks",
                });
            }
        }

        if let Some(project) = &self.project {
            validate_project(project)?;
        }

        Ok(())
    }

}

fn default_python_version() -> String {
    "3.12".to_owned()
}

/// `3`, `3.11`, `3.11.2`, optionally followed by a tag such as `-rc1` or `b2`.
fn is_valid_python_version(version: &str) -> bool {
    let numeric_end = version
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(version.len());
    let (numeric, suffix) = version.split_at(numeric_end);

    let parts: Vec<&str> = numeric.split('.').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return false;
    }

    match suffix.chars().next() {
        None => true,
        Some(first) if first == '-' || first.is_ascii_alphabetic() => suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')),
        Some(_) => false,
    }
}

fn validate_dependency(index: usize, dep: &str) -> crate::Result<()> {
    let invalid = |reason| Error::InvalidDependency {
        index,
        value: dep.to_owned(),
        reason,
    };

    if dep.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if dep.trim() != dep {
        return Err(invalid("must not have leading or trailing whitespace"));
    }
    if has_line_break(dep) {
        return Err(invalid("must not contain line breaks"));
    }
    if DependencyKind::classify(dep).is_local() {
        if dep.chars().any(char::is_whitespace) {
            return Err(invalid("local paths must not contain whitespace"));
        }
        if !is_plain_path(dep) {
            return Err(invalid(
                "local paths may only contain letters, digits and `-_./+@%`",
            ));
        }
        let name = dep.trim_end_matches('/').trim_start_matches("./");
        if name.is_empty() || name == "." {
            return Err(invalid("local path must name a file or directory"));
        }
    }
    Ok(())
}

fn validate_project(project: &str) -> crate::Result<()> {
    let invalid = |reason| Error::InvalidProjectPath {
        path: project.to_owned(),
        reason,
    };

    if project.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if project.contains("://") {
        return Err(invalid("must be a path inside the build context, not a URL"));
    }
    if project.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    if !is_plain_path(project) {
        return Err(invalid("may only contain letters, digits and `-_./+@%`"));
    }
    let name = project.trim_end_matches('/').trim_start_matches("./");
    if name.is_empty() || name == "." {
        return Err(invalid("must name a file or directory"));
    }
    Ok(())
}

fn invalid_key_reason(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        Some("must not be empty")
    } else if key.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if key.contains('=') {
        Some("must not contain '='")
    } else if key.contains('"') {
        Some("must not contain quotes")
    } else {
        None
    }
}

/// Paths end up unquoted in `COPY`, `--mount` and shell arguments, so only
/// characters inert in all three are accepted.
fn is_plain_path(path: &str) -> bool {
    path.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '+' | '@' | '%'))
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\n', '\r'])
}
