use std::collections::BTreeMap;

use mopy_core::MopyConfig;

use crate::base_image::{Arch, BaseImage, RUNTIME_HOME, RUNTIME_USER};
use crate::defaults::BuildDefaults;
use crate::merge::merge;
use crate::plan::{DependencyPlan, basename};

use super::{env_instructions, label_instruction};

const PYTHON_VERSION_LABEL: &str = "mopy.python.version";

/// Runtime stage: base image, labels, environment, installed packages, and
/// the project with its entry point.
pub fn run_stage(
    config: &MopyConfig,
    plan: &DependencyPlan<'_>,
    arch: &Arch,
    defaults: &BuildDefaults,
) -> Vec<String> {
    let mut lines = BaseImage::select(&config.python_version, arch).instructions();

    let version_label = BTreeMap::from([(
        PYTHON_VERSION_LABEL.to_owned(),
        config.python_version.clone(),
    )]);
    let labels = merge(&merge(&defaults.labels, &version_label), &config.labels);
    lines.extend(label_instruction(&labels));

    lines.extend(env_instructions(&merge(&defaults.run_env, &config.env)));

    if !plan.is_empty() {
        lines.push(format!(
            "COPY --from=builder --chown={RUNTIME_USER}:{RUNTIME_USER} /root/.local/ {RUNTIME_HOME}/.local/"
        ));
    }

    if let Some(project) = &config.project {
        lines.extend(project_instructions(project, &defaults.entry_module));
    }

    lines
}

/// Copy the project into the runtime home and point the interpreter at it.
///
/// A `.py` file runs from the home directory; a directory becomes the
/// working directory and runs its entry module.
fn project_instructions(project: &str, entry_module: &str) -> Vec<String> {
    let trimmed = project.trim_end_matches('/');
    let source = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let target = format!("{RUNTIME_HOME}/{}", basename(trimmed));

    let mut lines = vec![
        format!("COPY --chown={RUNTIME_USER}:{RUNTIME_USER} {source} {target}"),
        exec_form("ENTRYPOINT", &["python", "-u"]),
    ];
    if trimmed.ends_with(".py") {
        lines.push(format!("WORKDIR {RUNTIME_HOME}"));
        lines.push(exec_form("CMD", &[&target]));
    } else {
        lines.push(format!("WORKDIR {target}"));
        lines.push(exec_form("CMD", &[entry_module]));
    }
    lines
}

/// Exec-form instruction: a JSON array of strings.
fn exec_form(instruction: &str, args: &[&str]) -> String {
    let args: Vec<String> = args.iter().map(|a| json_string(a)).collect();
    format!("{instruction} [{}]", args.join(", "))
}

fn json_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
