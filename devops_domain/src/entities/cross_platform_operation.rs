// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cross-Platform Operation Entity
//!
//! Records one coordinated attempt to trigger or cancel a workflow across
//! several CI/CD platforms for the same repository. Ported from
//! `CrossPlatformOperation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::{OperationId, PlatformType, RepositoryRef};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
    PartialSuccess,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossPlatformOperation {
    pub id: OperationId,
    pub operation_type: String,
    pub repository: RepositoryRef,
    pub platforms: Vec<PlatformType>,
    pub status: OperationStatus,
    pub results: HashMap<String, serde_json::Value>,
    pub errors: HashMap<String, String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrossPlatformOperation {
    pub fn start(operation_type: impl Into<String>, repository: RepositoryRef, platforms: Vec<PlatformType>) -> Self {
        Self {
            id: OperationId::new(),
            operation_type: operation_type.into(),
            repository,
            platforms,
            status: OperationStatus::InProgress,
            results: HashMap::new(),
            errors: HashMap::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn fail_with_conflict(&mut self, message: impl Into<String>) {
        self.status = OperationStatus::Failed;
        self.errors.insert("resource_conflicts".into(), message.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn succeed(&mut self) {
        self.status = OperationStatus::Success;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail_with_coordination_error(&mut self, message: impl Into<String>) {
        self.status = OperationStatus::Failed;
        self.errors.insert("coordination_error".into(), message.into());
        self.completed_at = Some(Utc::now());
    }
}
