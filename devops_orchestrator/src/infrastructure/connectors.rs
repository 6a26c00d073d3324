// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CI/CD Connector Adapters
//!
//! One adapter per upstream platform, each implementing the domain's
//! [`devops_domain::services::CiCdConnector`] port over `reqwest`. Ported
//! from `github_actions_connector.py` / `gitlab_ci_connector.py`.

pub mod github_actions;
pub mod gitlab_ci;

pub use github_actions::GitHubActionsConnector;
pub use gitlab_ci::GitLabCiConnector;
