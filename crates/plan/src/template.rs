// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${name}` interpolation for host and command templates

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Regex pattern for `${variable_name}`
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

/// A template referenced a variable with no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unbound template variable ${{{0}}}")]
pub struct UnboundVar(pub String);

/// Names referenced by `template`, in order of appearance (may repeat).
pub fn referenced_vars(template: &str) -> impl Iterator<Item = &str> {
    VAR_PATTERN.captures_iter(template).filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Substitute every `${name}` in `template`.
///
/// An unknown variable is an error; nothing is partially substituted.
pub fn interpolate(template: &str, vars: &BTreeMap<String, String>) -> Result<String, UnboundVar> {
    if let Some(missing) = referenced_vars(template).find(|name| !vars.contains_key(*name)) {
        return Err(UnboundVar(missing.to_string()));
    }
    Ok(VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
