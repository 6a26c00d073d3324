// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Postgres Pipeline Registry Repository

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};
use std::str::FromStr;

use devops_domain::entities::PipelineRegistryEntry;
use devops_domain::error::DevOpsError;
use devops_domain::repositories::PipelineRegistryRepository;
use devops_domain::value_objects::{PipelineId, PlatformType};

pub struct PostgresPipelineRegistryRepository {
    pool: PgPool,
}

impl PostgresPipelineRegistryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: &sqlx::postgres::PgRow) -> Result<PipelineRegistryEntry, DevOpsError> {
    let pipeline_id: String = row.try_get("pipeline_id").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let platform: String = row.try_get("platform").map_err(|e| DevOpsError::internal(e.to_string()))?;
    Ok(PipelineRegistryEntry {
        pipeline_id: PipelineId::from_stored(pipeline_id),
        platform: PlatformType::from_str(&platform)?,
        repository: row.try_get("repository").map_err(|e| DevOpsError::internal(e.to_string()))?,
        workflow_name: row.try_get("workflow_name").map_err(|e| DevOpsError::internal(e.to_string()))?,
        success_rate: row.try_get("success_rate").map_err(|e| DevOpsError::internal(e.to_string()))?,
        avg_duration_secs: row.try_get("avg_duration_secs").map_err(|e| DevOpsError::internal(e.to_string()))?,
        total_runs: {
            let n: i64 = row.try_get("total_runs").map_err(|e| DevOpsError::internal(e.to_string()))?;
            n as u64
        },
        last_run_at: row.try_get("last_run_at").ok(),
    })
}

#[async_trait]
impl PipelineRegistryRepository for PostgresPipelineRegistryRepository {
    async fn upsert(&self, entry: &PipelineRegistryEntry) -> Result<(), DevOpsError> {
        sqlx::query(
            "INSERT INTO pipeline_registry
                (pipeline_id, platform, repository, workflow_name, success_rate, avg_duration_secs, total_runs, last_run_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (pipeline_id) DO UPDATE SET
                success_rate = EXCLUDED.success_rate,
                avg_duration_secs = EXCLUDED.avg_duration_secs,
                total_runs = EXCLUDED.total_runs,
                last_run_at = EXCLUDED.last_run_at",
        )
        .bind(entry.pipeline_id.as_str())
        .bind(entry.platform.as_str())
        .bind(&entry.repository)
        .bind(&entry.workflow_name)
        .bind(entry.success_rate)
        .bind(entry.avg_duration_secs)
        .bind(entry.total_runs as i64)
        .bind(entry.last_run_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to upsert pipeline registry entry: {e}")))?;
        Ok(())
    }

    async fn get(&self, id: &PipelineId) -> Result<Option<PipelineRegistryEntry>, DevOpsError> {
        let row = sqlx::query("SELECT * FROM pipeline_registry WHERE pipeline_id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to query pipeline registry: {e}")))?;
        row.as_ref().map(row_to_entry).transpose()
    }

    async fn list_by_platform(&self, platform: PlatformType) -> Result<Vec<PipelineRegistryEntry>, DevOpsError> {
        let rows = sqlx::query("SELECT * FROM pipeline_registry WHERE platform = $1")
            .bind(platform.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to list pipeline registry by platform: {e}")))?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn list_by_repository(&self, repository: &str) -> Result<Vec<PipelineRegistryEntry>, DevOpsError> {
        let rows = sqlx::query("SELECT * FROM pipeline_registry WHERE repository = $1")
            .bind(repository)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to list pipeline registry by repository: {e}")))?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn list_all(&self) -> Result<Vec<PipelineRegistryEntry>, DevOpsError> {
        let rows = sqlx::query("SELECT * FROM pipeline_registry ORDER BY repository, workflow_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to list pipeline registry: {e}")))?;
        rows.iter().map(row_to_entry).collect()
    }
}
