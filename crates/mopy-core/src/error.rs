use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to parse config")]
    ConfigParseStr { source: toml::de::Error },

    // ── Validation ──
    #[error("invalid python version {version:?}: expected e.g. \"3.11\" or \"3.11.2\"")]
    InvalidPythonVersion { version: String },

    #[error("invalid pip dependency #{index} {value:?}: {reason}")]
    InvalidDependency {
        index: usize,
        value: String,
        reason: &'static str,
    },

    #[error("invalid apt package {value:?}: {reason}")]
    InvalidAptPackage { value: String, reason: &'static str },

    #[error("invalid env key {key:?}: {reason}")]
    InvalidEnvKey { key: String, reason: &'static str },

    #[error("invalid value for env {key:?}: {reason}")]
    InvalidEnvValue { key: String, reason: &'static str },

    #[error("invalid label key {key:?}: {reason}")]
    InvalidLabelKey { key: String, reason: &'static str },

    #[error("invalid value for label {key:?}: {reason}")]
    InvalidLabelValue { key: String, reason: &'static str },

    #[error("invalid project path {path:?}: {reason}")]
    InvalidProjectPath { path: String, reason: &'static str },
}
