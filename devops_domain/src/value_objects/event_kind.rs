// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repository Event Kind and Webhook Source

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The kind of repository activity an event represents, mirroring
/// `GitEventType` from the event detector this platform generalizes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Commit,
    Push,
    BranchCreate,
    BranchDelete,
    Merge,
    TagCreate,
    TagDelete,
    PullRequest,
    Fork,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Push => "push",
            Self::BranchCreate => "branch_create",
            Self::BranchDelete => "branch_delete",
            Self::Merge => "merge",
            Self::TagCreate => "tag_create",
            Self::TagDelete => "tag_delete",
            Self::PullRequest => "pull_request",
            Self::Fork => "fork",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The platform a webhook delivery originated from, mirroring
/// `WebhookSource`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookSource {
    GitHub,
    GitLab,
    Jenkins,
    AzureDevOps,
    CircleCi,
    Bitbucket,
    Generic,
}

impl WebhookSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Jenkins => "jenkins",
            Self::AzureDevOps => "azure_devops",
            Self::CircleCi => "circleci",
            Self::Bitbucket => "bitbucket",
            Self::Generic => "generic",
        }
    }

    /// Default set of event types this source delivers, used to populate a
    /// newly registered webhook endpoint's `supported_events` when the
    /// caller does not specify one explicitly.
    pub fn default_supported_events(&self) -> &'static [&'static str] {
        match self {
            Self::GitHub => &["push", "pull_request", "create", "delete", "release"],
            Self::GitLab => &["push", "merge_request", "tag_push", "pipeline"],
            Self::Jenkins => &["build_started", "build_completed", "build_failed"],
            _ => &["push", "pull_request", "build"],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "github" => Some(Self::GitHub),
            "gitlab" => Some(Self::GitLab),
            "jenkins" => Some(Self::Jenkins),
            "azure_devops" => Some(Self::AzureDevOps),
            "circleci" => Some(Self::CircleCi),
            "bitbucket" => Some(Self::Bitbucket),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

impl Display for WebhookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
