// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request payload validation

use crate::catalog::{OperationPlan, RESERVED_VARS};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Longest accepted payload value.
pub const MAX_VALUE_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("operation {operation} is not supported: {reason}")]
    Unsupported { operation: String, reason: String },
    #[error("payload must be a JSON object")]
    NotObject,
    #[error("payload field {0} must be a string")]
    NotString(String),
    #[error("missing required payload field {0}")]
    Missing(String),
    #[error("payload field {0} is empty")]
    Empty(String),
    #[error("payload field {0} exceeds {MAX_VALUE_LEN} characters")]
    TooLong(String),
    #[error("payload field {0} must not start with '-'")]
    LeadingDash(String),
    #[error("payload field {field} contains invalid character {ch:?}")]
    InvalidChar { field: String, ch: char },
    #[error("unexpected payload field {0}")]
    Unknown(String),
}

/// Characters a payload value may carry into a command line.
///
/// Paths (`node1:/bricks/b1`) and key/value lists pass; anything a shell
/// would interpret does not.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | ':' | '@' | ',' | '=')
}

/// Check `payload` against `plan` and return the variables a job will bind.
///
/// Rejects without side effects; nothing here touches a remote host.
pub fn validate_payload(
    plan: &OperationPlan,
    payload: &Value,
) -> Result<BTreeMap<String, String>, PayloadError> {
    if let Some(reason) = &plan.unsupported {
        return Err(PayloadError::Unsupported {
            operation: plan.name.clone(),
            reason: reason.clone(),
        });
    }

    let empty = serde_json::Map::new();
    let fields = match payload {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => return Err(PayloadError::NotObject),
    };

    if let Some(key) = fields.keys().find(|k| {
        RESERVED_VARS.contains(&k.as_str()) || !plan.vars.iter().any(|v| v == *k)
    }) {
        return Err(PayloadError::Unknown(key.clone()));
    }

    let mut vars = BTreeMap::new();
    for name in &plan.vars {
        let value = match fields.get(name) {
            None | Some(Value::Null) => return Err(PayloadError::Missing(name.clone())),
            Some(Value::String(s)) => s,
            Some(_) => return Err(PayloadError::NotString(name.clone())),
        };
        check_value(name, value)?;
        vars.insert(name.clone(), value.clone());
    }
    Ok(vars)
}

fn check_value(field: &str, value: &str) -> Result<(), PayloadError> {
    if value.is_empty() {
        return Err(PayloadError::Empty(field.to_string()));
    }
    if value.chars().count() > MAX_VALUE_LEN {
        return Err(PayloadError::TooLong(field.to_string()));
    }
    // would be read as an option by ssh or gluster
    if value.starts_with('-') {
        return Err(PayloadError::LeadingDash(field.to_string()));
    }
    if let Some(ch) = value.chars().find(|c| !is_safe_char(*c)) {
        return Err(PayloadError::InvalidChar { field: field.to_string(), ch });
    }
    Ok(())
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
