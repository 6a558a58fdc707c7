// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output Parser: structured result document → [`CommandResult`]
//!
//! Every remote command prints one JSON document:
//!
//! ```text
//! { "version": 1, "op_ret": 0, "op_errno": 0, "op_errstr": "", "payload": { ... } }
//! ```
//!
//! `op_ret == 0` is success whatever else is present. On success the
//! step's [`ResultSchema`] selects and checks the typed part of `payload`.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use vj_core::CommandResult;
use vj_plan::ResultSchema;

/// Document versions this parser understands
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Raw output is echoed in errors up to this many characters
const RAW_DISPLAY_LIMIT: usize = 200;

/// Output that does not satisfy the document contract.
///
/// `raw` always holds the complete original text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed command output ({reason}): {}", vj_core::short(.raw.trim(), RAW_DISPLAY_LIMIT))]
pub struct ParseError {
    pub reason: String,
    pub raw: String,
}

#[derive(Deserialize)]
struct Document {
    version: u32,
    op_ret: i32,
    #[serde(default)]
    op_errno: i32,
    #[serde(default)]
    op_errstr: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
}

/// Decode `raw` against `schema`.
pub fn decode(raw: &str, schema: &ResultSchema) -> Result<CommandResult, ParseError> {
    let fail = |reason: String| ParseError { reason, raw: raw.to_string() };

    let doc: Document = serde_json::from_str(raw.trim()).map_err(|e| fail(e.to_string()))?;
    if !SUPPORTED_VERSIONS.contains(&doc.version) {
        return Err(fail(format!("unsupported document version {}", doc.version)));
    }

    let error_text = doc.op_errstr.unwrap_or_default();
    if doc.op_ret != 0 {
        return Ok(CommandResult {
            return_code: doc.op_ret,
            errno: doc.op_errno,
            error_text,
            payload: doc.payload,
        });
    }

    let payload = select(doc.payload, schema).map_err(fail)?;
    Ok(CommandResult { return_code: 0, errno: doc.op_errno, error_text, payload })
}

fn select(payload: Option<Value>, schema: &ResultSchema) -> Result<Option<Value>, String> {
    if schema.is_unconstrained() {
        return Ok(payload);
    }

    let mut selected = match (&schema.node, payload) {
        (Some(node), Some(Value::Object(mut map))) => {
            map.remove(node).ok_or_else(|| format!("payload has no {node} node"))?
        }
        (Some(node), Some(_)) => return Err(format!("payload is not an object (expected {node} node)")),
        (Some(node), None) => return Err(format!("missing payload (expected {node} node)")),
        (None, Some(value)) => value,
        (None, None) => return Err("missing payload".to_string()),
    };

    let label = schema.node.as_deref().unwrap_or("payload");
    if schema.single {
        selected = match selected {
            Value::Array(mut items) if items.len() == 1 => items.remove(0),
            Value::Array(items) => {
                return Err(format!("expected exactly one element in {label}, found {}", items.len()))
            }
            _ => return Err(format!("{label} is not a collection")),
        };
    }

    if !schema.required.is_empty() {
        let Value::Object(map) = &selected else {
            return Err(format!("{label} is not an object"));
        };
        if let Some(missing) = schema.required.iter().find(|f| !map.contains_key(f.as_str())) {
            return Err(format!("{label} is missing required field {missing}"));
        }
    }
    Ok(Some(selected))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
