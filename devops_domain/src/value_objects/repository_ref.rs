// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repository Reference Value Object
//!
//! A validated `owner/name` repository identifier, used as the join key
//! across events, webhooks, CI/CD pipelines, and resource locks.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::error::DevOpsError;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryRef(String);

impl RepositoryRef {
    pub fn new(value: impl Into<String>) -> Result<Self, DevOpsError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DevOpsError::validation("repository reference cannot be empty"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DevOpsError::validation(format!(
                "repository reference '{value}' must not contain whitespace"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a registered CI/CD pipeline, in the original platform's
/// composite form `platform:repository:workflow_id` — this keeps a single
/// workflow registered once per platform per repository, matching
/// `UniversalPipelineManager.discover_all_workflows`'s dedup key.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineId(String);

impl PipelineId {
    pub fn compose(platform: impl Display, repository: &RepositoryRef, workflow_id: impl Display) -> Self {
        Self(format!("{platform}:{repository}:{workflow_id}"))
    }

    /// Reconstructs an id previously produced by [`PipelineId::compose`] and
    /// read back from storage.
    pub fn from_stored(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an upstream workflow as the connector knows it (numeric on
/// GitHub Actions, numeric on GitLab, opaque string on Jenkins).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowRef {
    Numeric(i64),
    Named(String),
}

impl Display for WorkflowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Named(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty_and_whitespace_only() {
        assert!(RepositoryRef::new("").is_err());
        assert!(RepositoryRef::new("   ").is_err());
    }

    proptest! {
        /// Any string containing whitespace is rejected, regardless of what
        /// surrounds the whitespace.
        #[test]
        fn rejects_any_embedded_whitespace(prefix in "[a-zA-Z0-9/_-]{0,16}", suffix in "[a-zA-Z0-9/_-]{0,16}") {
            let value = format!("{prefix} {suffix}");
            prop_assert!(RepositoryRef::new(value).is_err());
        }

        /// Any non-empty string free of whitespace round-trips through
        /// `as_str` unchanged.
        #[test]
        fn accepts_and_roundtrips_non_whitespace(value in "[a-zA-Z0-9/_-]{1,32}") {
            let repo = RepositoryRef::new(value.clone()).unwrap();
            prop_assert_eq!(repo.as_str(), value);
        }
    }
}
