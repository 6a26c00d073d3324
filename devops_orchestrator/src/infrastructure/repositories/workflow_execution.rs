// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Postgres Workflow Execution Repository

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};

use devops_domain::entities::WorkflowExecution;
use devops_domain::error::DevOpsError;
use devops_domain::repositories::WorkflowExecutionRepository;
use devops_domain::value_objects::{ExecutionId, WorkflowStatus};

pub struct PostgresWorkflowExecutionRepository {
    pool: PgPool,
}

impl PostgresWorkflowExecutionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_status(s: &str) -> WorkflowStatus {
    match s {
        "queued" => WorkflowStatus::Queued,
        "running" => WorkflowStatus::Running,
        "success" => WorkflowStatus::Success,
        "failed" => WorkflowStatus::Failed,
        "cancelled" => WorkflowStatus::Cancelled,
        "skipped" => WorkflowStatus::Skipped,
        "timeout" => WorkflowStatus::Timeout,
        _ => WorkflowStatus::Unknown,
    }
}

fn row_to_execution(row: &sqlx::postgres::PgRow) -> Result<WorkflowExecution, DevOpsError> {
    let id: String = row.try_get("id").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let status: String = row.try_get("status").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let stage_results: serde_json::Value =
        row.try_get("stage_results").map_err(|e| DevOpsError::internal(e.to_string()))?;

    Ok(WorkflowExecution {
        id: ExecutionId::from_string(&id)?,
        definition_name: row.try_get("definition_name").map_err(|e| DevOpsError::internal(e.to_string()))?,
        status: parse_status(&status),
        stage_results: serde_json::from_value(stage_results).unwrap_or_default(),
        started_at: row.try_get("started_at").map_err(|e| DevOpsError::internal(e.to_string()))?,
        finished_at: row.try_get("finished_at").ok(),
    })
}

#[async_trait]
impl WorkflowExecutionRepository for PostgresWorkflowExecutionRepository {
    async fn save(&self, execution: &WorkflowExecution) -> Result<(), DevOpsError> {
        sqlx::query(
            "INSERT INTO workflow_executions
                (id, definition_name, status, stage_results, started_at, finished_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                stage_results = EXCLUDED.stage_results,
                finished_at = EXCLUDED.finished_at",
        )
        .bind(execution.id.to_string())
        .bind(&execution.definition_name)
        .bind(execution.status.as_str())
        .bind(serde_json::to_value(&execution.stage_results).unwrap_or_default())
        .bind(execution.started_at)
        .bind(execution.finished_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to save workflow execution: {e}")))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<WorkflowExecution>, DevOpsError> {
        let row = sqlx::query("SELECT * FROM workflow_executions WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to query workflow execution: {e}")))?;
        row.as_ref().map(row_to_execution).transpose()
    }

    async fn list_recent(&self, definition_name: &str, limit: usize) -> Result<Vec<WorkflowExecution>, DevOpsError> {
        let rows = sqlx::query(
            "SELECT * FROM workflow_executions WHERE definition_name = $1 ORDER BY started_at DESC LIMIT $2",
        )
        .bind(definition_name)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to list workflow executions: {e}")))?;
        rows.iter().map(row_to_execution).collect()
    }

    async fn list_recent_all(&self, limit: usize) -> Result<Vec<WorkflowExecution>, DevOpsError> {
        let rows = sqlx::query("SELECT * FROM workflow_executions ORDER BY started_at DESC LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to list workflow executions: {e}")))?;
        rows.iter().map(row_to_execution).collect()
    }
}
