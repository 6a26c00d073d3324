// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # GitHub Actions Connector

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

use devops_domain::entities::connector::{ConnectorStatus, TriggerResult, UniversalWorkflowInfo};
use devops_domain::error::DevOpsError;
use devops_domain::services::CiCdConnector;
use devops_domain::value_objects::{PlatformType, RepositoryRef, WorkflowRef, WorkflowStatus};

pub struct GitHubActionsConnector {
    client: Client,
    token: String,
    base_url: String,
}

impl GitHubActionsConnector {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: "https://api.github.com".to_string(),
        }
    }

    fn authed(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "devops-orchestrator")
    }

    /// Maps a transport/HTTP failure the way every connector method in this
    /// file needs to: rate limiting and server-side unavailability are
    /// transient, everything else is not.
    fn map_status(status: StatusCode, body: &str) -> DevOpsError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => DevOpsError::rate_limited(body.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DevOpsError::auth(body.to_string()),
            StatusCode::NOT_FOUND => DevOpsError::not_found(body.to_string()),
            s if s.is_server_error() => DevOpsError::unavailable(body.to_string()),
            _ => DevOpsError::internal(format!("github actions API error ({status}): {body}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowsResponse {
    workflows: Vec<GhWorkflow>,
}

#[derive(Debug, Deserialize)]
struct GhWorkflow {
    id: i64,
    name: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RunsResponse {
    workflow_runs: Vec<GhRun>,
}

#[derive(Debug, Deserialize)]
struct GhRun {
    id: i64,
    head_branch: String,
    head_sha: String,
    html_url: String,
    status: String,
    conclusion: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

fn normalize_status(status: &str, conclusion: Option<&str>) -> WorkflowStatus {
    match (status, conclusion) {
        ("completed", Some("success")) => WorkflowStatus::Success,
        ("completed", Some("failure")) => WorkflowStatus::Failed,
        ("completed", Some("cancelled")) => WorkflowStatus::Cancelled,
        ("completed", Some("skipped")) => WorkflowStatus::Skipped,
        ("completed", Some("timed_out")) => WorkflowStatus::Timeout,
        ("completed", _) => WorkflowStatus::Unknown,
        ("in_progress", _) => WorkflowStatus::Running,
        ("queued", _) | ("requested", _) | ("waiting", _) => WorkflowStatus::Queued,
        _ => WorkflowStatus::Unknown,
    }
}

#[async_trait]
impl CiCdConnector for GitHubActionsConnector {
    fn platform_type(&self) -> PlatformType {
        PlatformType::GithubActions
    }

    async fn discover_workflows(&self, repository: &RepositoryRef) -> Result<Vec<UniversalWorkflowInfo>, DevOpsError> {
        let url = format!("{}/repos/{}/actions/workflows", self.base_url, repository.as_str());
        let response = self.authed(&url).send().await.map_err(|e| DevOpsError::transient_io(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }
        let parsed: WorkflowsResponse = response.json().await.map_err(|e| DevOpsError::internal(e.to_string()))?;

        Ok(parsed
            .workflows
            .into_iter()
            .map(|w| UniversalWorkflowInfo {
                id: WorkflowRef::Numeric(w.id),
                name: w.name,
                platform: PlatformType::GithubActions,
                status: WorkflowStatus::Unknown,
                repository: repository.clone(),
                branch: String::new(),
                commit_sha: String::new(),
                url: w.html_url,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                metadata: HashMap::new(),
            })
            .collect())
    }

    async fn trigger_workflow(
        &self,
        repository: &RepositoryRef,
        workflow_id: &WorkflowRef,
        branch: &str,
        inputs: serde_json::Value,
    ) -> Result<TriggerResult, DevOpsError> {
        let url = format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.base_url,
            repository.as_str(),
            workflow_id
        );
        let body = serde_json::json!({ "ref": branch, "inputs": inputs });
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "devops-orchestrator")
            .json(&body)
            .send()
            .await
            .map_err(|e| DevOpsError::transient_io(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT && !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Ok(TriggerResult::err(format!("dispatch failed ({status}): {text}")));
        }
        Ok(TriggerResult::ok(
            workflow_id.clone(),
            WorkflowRef::Named(format!("dispatched:{branch}")),
            format!("{}/repos/{}/actions/workflows/{}", self.base_url, repository.as_str(), workflow_id),
        ))
    }

    async fn get_workflow_status(
        &self,
        repository: &RepositoryRef,
        workflow_id: &WorkflowRef,
        run_id: Option<&WorkflowRef>,
    ) -> Result<UniversalWorkflowInfo, DevOpsError> {
        let url = match run_id {
            Some(run) => format!("{}/repos/{}/actions/runs/{}", self.base_url, repository.as_str(), run),
            None => format!(
                "{}/repos/{}/actions/workflows/{}/runs?per_page=1",
                self.base_url,
                repository.as_str(),
                workflow_id
            ),
        };

        let response = self.authed(&url).send().await.map_err(|e| DevOpsError::transient_io(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }

        let run = if run_id.is_some() {
            response.json::<GhRun>().await.map_err(|e| DevOpsError::internal(e.to_string()))?
        } else {
            let parsed: RunsResponse = response.json().await.map_err(|e| DevOpsError::internal(e.to_string()))?;
            parsed
                .workflow_runs
                .into_iter()
                .next()
                .ok_or_else(|| DevOpsError::not_found("no runs found for workflow"))?
        };

        Ok(UniversalWorkflowInfo {
            id: WorkflowRef::Numeric(run.id),
            name: workflow_id.to_string(),
            platform: PlatformType::GithubActions,
            status: normalize_status(&run.status, run.conclusion.as_deref()),
            repository: repository.clone(),
            branch: run.head_branch,
            commit_sha: run.head_sha,
            url: run.html_url,
            created_at: run.created_at,
            updated_at: run.updated_at,
            metadata: HashMap::new(),
        })
    }

    async fn cancel_workflow(&self, repository: &RepositoryRef, run_id: &WorkflowRef) -> Result<bool, DevOpsError> {
        let url = format!("{}/repos/{}/actions/runs/{}/cancel", self.base_url, repository.as_str(), run_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "devops-orchestrator")
            .send()
            .await
            .map_err(|e| DevOpsError::transient_io(e.to_string()))?;
        Ok(response.status().is_success())
    }

    async fn connector_status(&self) -> Result<ConnectorStatus, DevOpsError> {
        let url = format!("{}/rate_limit", self.base_url);
        let response = self.authed(&url).send().await;
        match response {
            Ok(r) if r.status().is_success() => {
                let remaining = r
                    .headers()
                    .get("x-ratelimit-remaining")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u32>().ok());
                Ok(ConnectorStatus {
                    platform: PlatformType::GithubActions,
                    status: "ok".to_string(),
                    connected: true,
                    rate_limit_remaining: remaining,
                })
            }
            _ => Ok(ConnectorStatus {
                platform: PlatformType::GithubActions,
                status: "unreachable".to_string(),
                connected: false,
                rate_limit_remaining: None,
            }),
        }
    }
}
