use std::fmt;
use std::str::FromStr;

/// Distroless Python image, pinned by digest. Ships Python 3.9 only.
pub const DISTROLESS_IMAGE: &str = "gcr.io/distroless/python3:nonroot@sha256:49aeb0efbe5c01375e6d747c138c87cf89c6aa4dc5daac955b9afb6aba4027e4";

/// Python minor series the distroless image provides.
const DISTROLESS_SERIES: &[&str] = &["3.9"];

/// Non-root identity of the runtime stage, shared with distroless `nonroot`.
pub const RUNTIME_USER: &str = "nonroot";
pub const RUNTIME_UID: u32 = 65532;
pub const RUNTIME_HOME: &str = "/home/nonroot";

/// Target architecture of the image being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
    Other(String),
}

impl Arch {
    /// Architecture of the machine running mopy.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Self::Amd64,
            "aarch64" => Self::Arm64,
            other => Self::Other(other.to_owned()),
        }
    }

    fn has_distroless(&self) -> bool {
        matches!(self, Self::Amd64 | Self::Arm64)
    }
}

impl FromStr for Arch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" => Self::Amd64,
            "arm64" | "aarch64" => Self::Arm64,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amd64 => f.write_str("amd64"),
            Self::Arm64 => f.write_str("arm64"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Runtime base image for the final stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseImage {
    /// Digest-pinned distroless image; the non-root user already exists.
    Distroless,
    /// `python:<version>-slim` with a manually created non-root user.
    Slim { python_version: String },
}

impl BaseImage {
    pub fn select(python_version: &str, arch: &Arch) -> Self {
        let supported = DISTROLESS_SERIES
            .iter()
            .any(|series| in_series(python_version, series));

        let image = if supported && arch.has_distroless() {
            Self::Distroless
        } else {
            Self::Slim {
                python_version: python_version.to_owned(),
            }
        };
        tracing::debug!(python = python_version, %arch, ?image, "selected runtime base image");
        image
    }

    /// `FROM` plus whatever is needed to run as the non-root identity.
    pub fn instructions(&self) -> Vec<String> {
        match self {
            Self::Distroless => vec![format!("FROM {DISTROLESS_IMAGE}")],
            Self::Slim { python_version } => vec![
                format!("FROM python:{python_version}-slim"),
                format!(
                    "RUN useradd --uid={RUNTIME_UID} --user-group --home-dir={RUNTIME_HOME} --create-home {RUNTIME_USER}"
                ),
                format!("USER {RUNTIME_UID}:{RUNTIME_UID}"),
            ],
        }
    }
}

/// `3.9` and `3.9.18` are in series `3.9`; `3.90` is not.
fn in_series(version: &str, series: &str) -> bool {
    version
        .strip_prefix(series)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
