//! Stage composers. Each returns the instruction lines of one stage, in
//! order; the generator concatenates them.

mod build;
mod run;

use std::collections::BTreeMap;

pub use build::build_stage;
pub use run::run_stage;

/// One `ENV KEY=value` line per entry, in key order.
pub(crate) fn env_instructions(env: &BTreeMap<String, String>) -> Vec<String> {
    env.iter()
        .map(|(key, value)| format!("ENV {key}={}", env_value(value)))
        .collect()
}

/// A single `LABEL` line with every entry in key order.
pub(crate) fn label_instruction(labels: &BTreeMap<String, String>) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    let pairs: Vec<String> = labels
        .iter()
        .map(|(key, value)| format!("{key}={}", double_quote(value)))
        .collect();
    Some(format!("LABEL {}", pairs.join(" ")))
}

fn env_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if needs_quotes {
        double_quote(value)
    } else {
        value.to_owned()
    }
}

fn double_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', r"\\").replace('"', "\\\""))
}
