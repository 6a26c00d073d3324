// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Workflow Execution Repository Contract

use async_trait::async_trait;

use crate::entities::WorkflowExecution;
use crate::error::DevOpsError;
use crate::value_objects::ExecutionId;

#[async_trait]
pub trait WorkflowExecutionRepository: Send + Sync {
    async fn save(&self, execution: &WorkflowExecution) -> Result<(), DevOpsError>;

    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<WorkflowExecution>, DevOpsError>;

    async fn list_recent(&self, definition_name: &str, limit: usize) -> Result<Vec<WorkflowExecution>, DevOpsError>;

    /// The most recent executions across every workflow definition, newest
    /// first — the dashboard snapshot's `workflow_executions[]` feed.
    async fn list_recent_all(&self, limit: usize) -> Result<Vec<WorkflowExecution>, DevOpsError>;
}
