// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CI/CD Platform Type
//!
//! Mirrors `PlatformType` from the connector contract this platform was
//! distilled from: every CI/CD connector, pipeline registry entry, and
//! coordination rule is keyed by one of these variants.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    GithubActions,
    GitlabCi,
    Jenkins,
    AzureDevops,
    CircleCi,
    Generic,
}

impl PlatformType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GithubActions => "github_actions",
            Self::GitlabCi => "gitlab_ci",
            Self::Jenkins => "jenkins",
            Self::AzureDevops => "azure_devops",
            Self::CircleCi => "circleci",
            Self::Generic => "generic",
        }
    }
}

impl Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlatformType {
    type Err = crate::error::DevOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github_actions" => Ok(Self::GithubActions),
            "gitlab_ci" => Ok(Self::GitlabCi),
            "jenkins" => Ok(Self::Jenkins),
            "azure_devops" => Ok(Self::AzureDevops),
            "circleci" => Ok(Self::CircleCi),
            "generic" => Ok(Self::Generic),
            other => Err(Self::Err::validation(format!("unknown platform type '{other}'"))),
        }
    }
}

/// Universal workflow run status, normalized across all connectors.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Queued,
    Running,
    Success,
    Failed,
    Cancelled,
    Skipped,
    Timeout,
    Unknown,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
