use mopy_core::MopyConfig;

use crate::base_image::Arch;
use crate::defaults::BuildDefaults;
use crate::plan::DependencyPlan;
use crate::stage::{build_stage, run_stage};

/// Enables `RUN --mount` and `COPY --link`.
const SYNTAX_DIRECTIVE: &str = "# syntax=docker/dockerfile:1";

/// Generates a two-stage Dockerfile: a builder that installs dependencies
/// into `/root/.local`, and a runtime that ships only that tree and the
/// project.
///
/// The config must have been validated; rendering itself cannot fail.
pub struct DockerfileGenerator<'a> {
    config: &'a MopyConfig,
    arch: Arch,
    defaults: BuildDefaults,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a MopyConfig, arch: Arch) -> Self {
        Self {
            config,
            arch,
            defaults: BuildDefaults::default(),
        }
    }

    /// Replace the built-in environment, label, and package tables.
    pub fn with_defaults(mut self, defaults: BuildDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn render(&self) -> String {
        let plan = DependencyPlan::resolve(&self.config.pip);
        let builder = build_stage(self.config, &plan, &self.defaults);
        let runtime = run_stage(self.config, &plan, &self.arch, &self.defaults);

        tracing::debug!(
            python = %self.config.python_version,
            arch = %self.arch,
            builder_lines = builder.len(),
            runtime_lines = runtime.len(),
            "rendered Dockerfile"
        );

        format!(
            "{SYNTAX_DIRECTIVE}\n\n# === Stage 1: Builder ===\n{}\n\n# === Stage 2: Runtime ===\n{}\n",
            builder.join("\n"),
            runtime.join("\n"),
        )
    }
}
