// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # GitLab CI Connector
//!
//! Unlike GitHub Actions, GitLab's API returns a `Retry-After` header on
//! `429` responses; this connector honors it by surfacing the wait as part
//! of the rate-limited error message rather than sleeping inline, leaving
//! the retry decision (and its delay) to the background task fabric's retry
//! profile.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

use devops_domain::entities::connector::{ConnectorStatus, TriggerResult, UniversalWorkflowInfo};
use devops_domain::error::DevOpsError;
use devops_domain::services::CiCdConnector;
use devops_domain::value_objects::{PlatformType, RepositoryRef, WorkflowRef, WorkflowStatus};

pub struct GitLabCiConnector {
    client: Client,
    token: String,
    base_url: String,
}

impl GitLabCiConnector {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: "https://gitlab.com/api/v4".to_string(),
        }
    }

    fn project_path(repository: &RepositoryRef) -> String {
        urlencoding_slashes(repository.as_str())
    }

    fn authed(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).header("PRIVATE-TOKEN", &self.token)
    }

    fn map_response_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> DevOpsError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let wait = retry_after.unwrap_or(60);
                DevOpsError::rate_limited(format!("gitlab rate limited, retry after {wait}s: {body}"))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DevOpsError::auth(body.to_string()),
            StatusCode::NOT_FOUND => DevOpsError::not_found(body.to_string()),
            s if s.is_server_error() => DevOpsError::unavailable(body.to_string()),
            _ => DevOpsError::internal(format!("gitlab API error ({status}): {body}")),
        }
    }
}

fn urlencoding_slashes(path: &str) -> String {
    path.replace('/', "%2F")
}

#[derive(Debug, Deserialize)]
struct GlPipeline {
    id: i64,
    #[serde(rename = "ref")]
    git_ref: String,
    sha: String,
    status: String,
    web_url: String,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

fn normalize_status(status: &str) -> WorkflowStatus {
    match status {
        "success" => WorkflowStatus::Success,
        "failed" => WorkflowStatus::Failed,
        "canceled" | "cancelled" => WorkflowStatus::Cancelled,
        "skipped" => WorkflowStatus::Skipped,
        "running" => WorkflowStatus::Running,
        "pending" | "created" | "waiting_for_resource" => WorkflowStatus::Queued,
        _ => WorkflowStatus::Unknown,
    }
}

#[async_trait]
impl CiCdConnector for GitLabCiConnector {
    fn platform_type(&self) -> PlatformType {
        PlatformType::GitlabCi
    }

    async fn discover_workflows(&self, repository: &RepositoryRef) -> Result<Vec<UniversalWorkflowInfo>, DevOpsError> {
        let url = format!("{}/projects/{}/pipelines?per_page=20", self.base_url, Self::project_path(repository));
        let response = self.authed(&url).send().await.map_err(|e| DevOpsError::transient_io(e.to_string()))?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_response_error(status, retry_after, &body));
        }
        let pipelines: Vec<GlPipeline> = response.json().await.map_err(|e| DevOpsError::internal(e.to_string()))?;

        Ok(pipelines
            .into_iter()
            .map(|p| UniversalWorkflowInfo {
                id: WorkflowRef::Numeric(p.id),
                name: format!("pipeline-{}", p.id),
                platform: PlatformType::GitlabCi,
                status: normalize_status(&p.status),
                repository: repository.clone(),
                branch: p.git_ref,
                commit_sha: p.sha,
                url: p.web_url,
                created_at: p.created_at,
                updated_at: p.updated_at,
                metadata: HashMap::new(),
            })
            .collect())
    }

    async fn trigger_workflow(
        &self,
        repository: &RepositoryRef,
        _workflow_id: &WorkflowRef,
        branch: &str,
        inputs: serde_json::Value,
    ) -> Result<TriggerResult, DevOpsError> {
        let url = format!("{}/projects/{}/pipeline", self.base_url, Self::project_path(repository));
        let body = serde_json::json!({ "ref": branch, "variables": flatten_variables(&inputs) });
        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DevOpsError::transient_io(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Ok(TriggerResult::err(format!("pipeline creation failed ({status}): {text}")));
        }
        let pipeline: GlPipeline = response.json().await.map_err(|e| DevOpsError::internal(e.to_string()))?;
        Ok(TriggerResult::ok(
            WorkflowRef::Numeric(pipeline.id),
            WorkflowRef::Numeric(pipeline.id),
            pipeline.web_url,
        ))
    }

    async fn get_workflow_status(
        &self,
        repository: &RepositoryRef,
        _workflow_id: &WorkflowRef,
        run_id: Option<&WorkflowRef>,
    ) -> Result<UniversalWorkflowInfo, DevOpsError> {
        let run = run_id.ok_or_else(|| DevOpsError::validation("gitlab status lookup requires a pipeline run id"))?;
        let url = format!("{}/projects/{}/pipelines/{}", self.base_url, Self::project_path(repository), run);
        let response = self.authed(&url).send().await.map_err(|e| DevOpsError::transient_io(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_response_error(status, None, &body));
        }
        let pipeline: GlPipeline = response.json().await.map_err(|e| DevOpsError::internal(e.to_string()))?;
        Ok(UniversalWorkflowInfo {
            id: WorkflowRef::Numeric(pipeline.id),
            name: format!("pipeline-{}", pipeline.id),
            platform: PlatformType::GitlabCi,
            status: normalize_status(&pipeline.status),
            repository: repository.clone(),
            branch: pipeline.git_ref,
            commit_sha: pipeline.sha,
            url: pipeline.web_url,
            created_at: pipeline.created_at,
            updated_at: pipeline.updated_at,
            metadata: HashMap::new(),
        })
    }

    async fn cancel_workflow(&self, repository: &RepositoryRef, run_id: &WorkflowRef) -> Result<bool, DevOpsError> {
        let url = format!("{}/projects/{}/pipelines/{}/cancel", self.base_url, Self::project_path(repository), run_id);
        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await
            .map_err(|e| DevOpsError::transient_io(e.to_string()))?;
        Ok(response.status().is_success())
    }

    async fn connector_status(&self) -> Result<ConnectorStatus, DevOpsError> {
        let url = format!("{}/user", self.base_url);
        match self.authed(&url).send().await {
            Ok(r) if r.status().is_success() => {
                let remaining = r
                    .headers()
                    .get("ratelimit-remaining")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u32>().ok());
                Ok(ConnectorStatus {
                    platform: PlatformType::GitlabCi,
                    status: "ok".to_string(),
                    connected: true,
                    rate_limit_remaining: remaining,
                })
            }
            _ => Ok(ConnectorStatus {
                platform: PlatformType::GitlabCi,
                status: "unreachable".to_string(),
                connected: false,
                rate_limit_remaining: None,
            }),
        }
    }
}

fn flatten_variables(inputs: &serde_json::Value) -> Vec<serde_json::Value> {
    let Some(map) = inputs.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            serde_json::json!({
                "key": key,
                "value": value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()),
            })
        })
        .collect()
}
