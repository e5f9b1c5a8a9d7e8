//! Resolved dependency plan.
//!
//! Every local dependency is resolved exactly once into a [`LocalDependency`]
//! carrying its index and temporary target. The copy instructions, the mount
//! flags and the install arguments are all rendered from that single list, so
//! one declaration always maps to one path across the three fragments.

use mopy_core::DependencyKind;

/// Staging directory inside the builder for local dependencies.
const STAGING_DIR: &str = "/tmp";
const PIP_CACHE_MOUNT: &str = "--mount=type=cache,target=/root/.cache";
const SSH_AGENT_MOUNT: &str = "--mount=type=ssh,required=true";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    /// Bind-mounted and installed with `-r`.
    Requirements,
    /// Copied into the builder and installed by path.
    Copied,
}

/// A local dependency with its position-derived staging path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDependency {
    /// Position among local dependencies, in declaration order.
    pub index: usize,
    pub kind: LocalKind,
    /// Path relative to the build context.
    pub source: String,
    /// Path inside the builder the dependency is installed from. A copied
    /// file becomes this path; a copied directory lands at it.
    pub target: String,
}

impl LocalDependency {
    fn resolve(index: usize, raw: &str, kind: LocalKind) -> Self {
        let trimmed = raw.trim_end_matches('/');
        let source = trimmed.strip_prefix("./").unwrap_or(trimmed).to_owned();
        let target = match kind {
            LocalKind::Requirements => format!("{STAGING_DIR}/{index}/requirements.txt"),
            LocalKind::Copied => format!("{STAGING_DIR}/{index}/{}", basename(trimmed)),
        };
        Self {
            index,
            kind,
            source,
            target,
        }
    }
}

/// Dependencies partitioned by kind, each partition in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPlan<'a> {
    /// Requirements files and copied paths, indexed `0..n`.
    pub locals: Vec<LocalDependency>,
    /// Index packages and specifiers.
    pub pypi: Vec<&'a str>,
    /// `http(s)://` and `git+http(s)://` URLs.
    pub http: Vec<&'a str>,
    /// `ssh://` and `git+ssh://` URLs.
    pub ssh: Vec<&'a str>,
    needs_vcs: bool,
}

impl<'a> DependencyPlan<'a> {
    /// Classify declarations in one pass. Local dependencies are indexed
    /// `0..n` in the order they appear.
    pub fn resolve(declarations: &'a [String]) -> Self {
        let mut plan = Self::default();
        for raw in declarations {
            let raw = raw.as_str();
            let kind = DependencyKind::classify(raw);
            plan.needs_vcs |= kind.requires_vcs();
            match kind {
                DependencyKind::Requirements => plan.push_local(raw, LocalKind::Requirements),
                DependencyKind::Local => plan.push_local(raw, LocalKind::Copied),
                DependencyKind::PyPi => plan.pypi.push(raw),
                DependencyKind::Http => plan.http.push(raw),
                DependencyKind::Ssh => plan.ssh.push(raw),
            }
        }
        tracing::debug!(
            local = plan.locals.len(),
            pypi = plan.pypi.len(),
            http = plan.http.len(),
            ssh = plan.ssh.len(),
            "resolved dependency plan"
        );
        plan
    }

    fn push_local(&mut self, raw: &str, kind: LocalKind) {
        let index = self.locals.len();
        self.locals.push(LocalDependency::resolve(index, raw, kind));
    }

    /// No declarations at all; every install-related instruction is elided.
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
            && self.pypi.is_empty()
            && self.http.is_empty()
            && self.ssh.is_empty()
    }

    /// Remote VCS dependencies need git tooling in the builder.
    pub fn needs_vcs(&self) -> bool {
        self.needs_vcs
    }

    /// Whether the install step must forward the SSH agent.
    pub fn has_ssh(&self) -> bool {
        !self.ssh.is_empty()
    }

    fn requirements(&self) -> impl Iterator<Item = &LocalDependency> {
        self.locals.iter().filter(|d| d.kind == LocalKind::Requirements)
    }

    fn copied(&self) -> impl Iterator<Item = &LocalDependency> {
        self.locals.iter().filter(|d| d.kind == LocalKind::Copied)
    }

    /// `COPY --link` for every copied local dependency.
    pub fn copy_instructions(&self) -> Vec<String> {
        self.copied()
            .map(|d| format!("COPY --link {} {}", d.source, d.target))
            .collect()
    }

    /// `RUN --mount` flags for the install step: pip cache, SSH agent when
    /// needed, then one bind mount per requirements file.
    pub fn mount_flags(&self) -> Vec<String> {
        let mut flags = vec![PIP_CACHE_MOUNT.to_owned()];
        if self.has_ssh() {
            flags.push(SSH_AGENT_MOUNT.to_owned());
        }
        flags.extend(
            self.requirements()
                .map(|d| format!("--mount=type=bind,source={},target={}", d.source, d.target)),
        );
        flags
    }

    /// `pip install` arguments: requirements files, copied locals, then PyPI,
    /// HTTP and SSH declarations.
    pub fn install_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for d in self.requirements() {
            args.push("-r".to_owned());
            args.push(d.target.clone());
        }
        args.extend(self.copied().map(|d| shell_quote(&d.target)));
        args.extend(
            self.pypi
                .iter()
                .chain(&self.http)
                .chain(&self.ssh)
                .map(|dep| shell_quote(dep)),
        );
        args
    }
}

/// Last path component, with trailing separators removed by the caller.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Single-quote a shell word unless it only holds characters that are never
/// special to `/bin/sh`.
pub(crate) fn shell_quote(word: &str) -> String {
    let is_plain = !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '+' | '=' | ',' | '%' | '~')
        });
    if is_plain {
        word.to_owned()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
