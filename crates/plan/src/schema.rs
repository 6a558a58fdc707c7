// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expected shape of a command's typed payload

use serde::{Deserialize, Serialize};

/// What a successful result document must carry beyond its return code.
///
/// With the default (empty) schema any successful document is accepted
/// and the whole `payload` node, if present, becomes the step's result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultSchema {
    /// Key inside `payload` holding the command-specific node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// The node is a collection that must contain exactly one element;
    /// that element becomes the result
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub single: bool,
    /// Fields the (selected) result object must contain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ResultSchema {
    pub fn node(name: impl Into<String>) -> Self {
        Self { node: Some(name.into()), ..Self::default() }
    }

    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    /// True when the schema places no constraint on the payload.
    pub fn is_unconstrained(&self) -> bool {
        self.node.is_none() && !self.single && self.required.is_empty()
    }
}
