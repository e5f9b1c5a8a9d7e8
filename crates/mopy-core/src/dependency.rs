//! Classification of raw `pip` declarations.
//!
//! | Declaration                              | Kind           |
//! |------------------------------------------|----------------|
//! | `./deps/requirements.txt`                | `Requirements` |
//! | `./libs/mylib/`, `../shared`, `/opt/pkg` | `Local`        |
//! | `numpy`, `requests[socks]>=2.31`         | `PyPi`         |
//! | `git+https://host/repo.git`              | `Http`         |
//! | `git+ssh://git@host/repo.git`            | `Ssh`          |

const REQUIREMENTS_SUFFIX: &str = "/requirements.txt";
const SCHEME_MARKER: &str = "://";
const SSH_SCHEMES: &[&str] = &["git+ssh://", "ssh://"];
const HTTP_SCHEMES: &[&str] = &["git+https://", "git+http://", "https://", "http://"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// A requirements file inside the build context, bind-mounted at install time.
    Requirements,
    /// Any other file or directory inside the build context, copied before install.
    Local,
    /// A package name or version specifier resolved from the index.
    PyPi,
    /// A remote archive or VCS repository fetched over HTTP(S).
    Http,
    /// A VCS repository fetched over SSH with the forwarded agent.
    Ssh,
}

impl DependencyKind {
    /// Classify a declaration by its string form alone.
    pub fn classify(raw: &str) -> Self {
        if SSH_SCHEMES.iter().any(|s| raw.starts_with(s)) {
            return Self::Ssh;
        }
        if HTTP_SCHEMES.iter().any(|s| raw.starts_with(s)) {
            return Self::Http;
        }
        if !is_local_path(raw) {
            return Self::PyPi;
        }
        if raw.ends_with(REQUIREMENTS_SUFFIX) {
            Self::Requirements
        } else {
            Self::Local
        }
    }

    /// Whether the declaration lives in the build context.
    pub fn is_local(self) -> bool {
        matches!(self, Self::Requirements | Self::Local)
    }

    /// Whether installing this kind needs git tooling in the builder.
    pub fn requires_vcs(self) -> bool {
        matches!(self, Self::Http | Self::Ssh)
    }
}

/// A declaration without a scheme marker that contains a path separator.
///
/// `pkg @ https://...` direct references carry a scheme and stay PyPI.
fn is_local_path(raw: &str) -> bool {
    !raw.contains(SCHEME_MARKER) && raw.contains('/')
}
