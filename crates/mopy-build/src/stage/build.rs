use mopy_core::MopyConfig;

use crate::defaults::BuildDefaults;
use crate::merge::merge;
use crate::plan::DependencyPlan;

use super::env_instructions;

/// Persistent apt cache and state across builds.
const APT_CACHE_MOUNTS: &str =
    "--mount=type=cache,target=/var/cache/apt --mount=type=cache,target=/var/lib/apt";

/// Strips what the runtime never needs from the user-local install tree.
const CLEANUP: &str = concat!(
    "RUN find /root/.local/lib/python*/ -name 'tests' -exec rm -r '{}' + && ",
    "find /root/.local/lib/python*/site-packages/ -name '*.so' ",
    "-exec sh -c 'file \"{}\" | grep -q \"not stripped\" && strip -s \"{}\"' \\; && ",
    "find /root/.local/lib/python*/ -type f -name '*.pyc' -delete && ",
    "find /root/.local/lib/python*/ -type d -name '__pycache__' -delete",
);

/// Builder stage: base image, OS packages, environment, dependency
/// installation, cleanup.
pub fn build_stage(
    config: &MopyConfig,
    plan: &DependencyPlan<'_>,
    defaults: &BuildDefaults,
) -> Vec<String> {
    let mut lines = vec![
        format!("FROM python:{} AS builder", config.python_version),
        "WORKDIR /build".to_owned(),
    ];

    lines.extend(apt_instruction(config, plan, defaults));
    lines.extend(env_instructions(&merge(&defaults.build_env, &config.env)));

    if !plan.is_empty() {
        lines.extend(plan.copy_instructions());
        lines.push(format!(
            "RUN {} pip install {}",
            plan.mount_flags().join(" "),
            plan.install_args().join(" ")
        ));
        lines.push(CLEANUP.to_owned());
    }

    lines
}

fn apt_instruction(
    config: &MopyConfig,
    plan: &DependencyPlan<'_>,
    defaults: &BuildDefaults,
) -> Option<String> {
    let forced: &[String] = if plan.needs_vcs() {
        defaults.vcs_packages.as_slice()
    } else {
        &[]
    };

    let mut packages: Vec<&str> = Vec::new();
    for package in forced.iter().chain(&config.apt) {
        if !packages.contains(&package.as_str()) {
            packages.push(package);
        }
    }

    if packages.is_empty() {
        return None;
    }
    Some(format!(
        "RUN {APT_CACHE_MOUNTS} apt-get update && apt-get install -y {}",
        packages.join(" ")
    ))
}
