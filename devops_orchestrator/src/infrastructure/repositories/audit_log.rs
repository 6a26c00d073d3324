// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Postgres Audit Log Repository

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};

use devops_domain::entities::AuditLogEntry;
use devops_domain::error::DevOpsError;
use devops_domain::repositories::AuditLogRepository;
use devops_domain::value_objects::AuditLogId;

pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DevOpsError> {
        sqlx::query(
            "INSERT INTO audit_log (id, actor, action, resource_type, resource_id, detail, occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.actor)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(&entry.resource_id)
        .bind(&entry.detail)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to append audit log entry: {e}")))?;
        Ok(())
    }

    async fn list_recent(&self, resource_type: &str, limit: usize) -> Result<Vec<AuditLogEntry>, DevOpsError> {
        let rows = sqlx::query(
            "SELECT * FROM audit_log WHERE resource_type = $1 ORDER BY occurred_at DESC LIMIT $2",
        )
        .bind(resource_type)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to list audit log entries: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(|e| DevOpsError::internal(e.to_string()))?;
                Ok(AuditLogEntry {
                    id: AuditLogId::from_string(&id)?,
                    actor: row.try_get("actor").map_err(|e| DevOpsError::internal(e.to_string()))?,
                    action: row.try_get("action").map_err(|e| DevOpsError::internal(e.to_string()))?,
                    resource_type: row.try_get("resource_type").map_err(|e| DevOpsError::internal(e.to_string()))?,
                    resource_id: row.try_get("resource_id").map_err(|e| DevOpsError::internal(e.to_string()))?,
                    detail: row.try_get("detail").map_err(|e| DevOpsError::internal(e.to_string()))?,
                    timestamp: row.try_get("occurred_at").map_err(|e| DevOpsError::internal(e.to_string()))?,
                })
            })
            .collect()
    }
}
