// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CI/CD Connector Value Types
//!
//! The shapes every CI/CD connector adapter normalizes its platform-specific
//! API responses into. Ported from `UniversalWorkflowInfo` / `TriggerResult`
//! / connector status in `base_connector.py`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::{PlatformType, RepositoryRef, WorkflowRef, WorkflowStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversalWorkflowInfo {
    pub id: WorkflowRef,
    pub name: String,
    pub platform: PlatformType,
    pub status: WorkflowStatus,
    pub repository: RepositoryRef,
    pub branch: String,
    pub commit_sha: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResult {
    pub success: bool,
    pub workflow_id: Option<WorkflowRef>,
    pub run_id: Option<WorkflowRef>,
    pub url: Option<String>,
    pub error: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TriggerResult {
    pub fn ok(workflow_id: WorkflowRef, run_id: WorkflowRef, url: String) -> Self {
        Self {
            success: true,
            workflow_id: Some(workflow_id),
            run_id: Some(run_id),
            url: Some(url),
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            workflow_id: None,
            run_id: None,
            url: None,
            error: Some(error.into()),
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub platform: PlatformType,
    pub status: String,
    pub connected: bool,
    pub rate_limit_remaining: Option<u32>,
}
