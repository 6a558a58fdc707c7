// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target resource identifiers (volumes, snapshots, block volumes).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted resource identifier.
pub const MAX_RESOURCE_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdError {
    #[error("resource id is empty")]
    Empty,
    #[error("resource id exceeds {MAX_RESOURCE_ID_LEN} characters")]
    TooLong,
    #[error("resource id contains invalid character {0:?}")]
    InvalidChar(char),
    #[error("resource id must not start with '-'")]
    LeadingDash,
}

/// Identifier of the storage entity an operation acts upon.
///
/// This is the unit of per-resource serialization: at most one job may
/// hold a given `ResourceId` at a time. Identifiers are restricted to
/// `[A-Za-z0-9._-]`, never starting with `-`, so they can be interpolated
/// into remote commands without quoting or being taken for an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ResourceIdError> {
        let raw = raw.into();
        validate_name(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that `name` is a non-empty, bounded, shell-inert identifier.
pub fn validate_name(name: &str) -> Result<(), ResourceIdError> {
    if name.is_empty() {
        return Err(ResourceIdError::Empty);
    }
    if name.chars().count() > MAX_RESOURCE_ID_LEN {
        return Err(ResourceIdError::TooLong);
    }
    if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))) {
        return Err(ResourceIdError::InvalidChar(bad));
    }
    if name.starts_with('-') {
        return Err(ResourceIdError::LeadingDash);
    }
    Ok(())
}

impl TryFrom<String> for ResourceId {
    type Error = ResourceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
