// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Postgres Event Repository

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};
use std::collections::HashMap;

use devops_domain::entities::RepositoryEvent;
use devops_domain::error::DevOpsError;
use devops_domain::repositories::EventRepository;
use devops_domain::value_objects::{EventId, EventKind, RepositoryRef};

pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_event_kind(s: &str) -> Result<EventKind, DevOpsError> {
    match s {
        "commit" => Ok(EventKind::Commit),
        "push" => Ok(EventKind::Push),
        "branch_create" => Ok(EventKind::BranchCreate),
        "branch_delete" => Ok(EventKind::BranchDelete),
        "merge" => Ok(EventKind::Merge),
        "tag_create" => Ok(EventKind::TagCreate),
        "tag_delete" => Ok(EventKind::TagDelete),
        "pull_request" => Ok(EventKind::PullRequest),
        "fork" => Ok(EventKind::Fork),
        other => Err(DevOpsError::internal(format!("unknown stored event kind '{other}'"))),
    }
}

fn row_to_event(row: &sqlx::postgres::PgRow) -> Result<RepositoryEvent, DevOpsError> {
    let id: String = row.try_get("id").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let kind: String = row.try_get("kind").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let repository: String = row.try_get("repository").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let files_changed: serde_json::Value =
        row.try_get("files_changed").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let metadata: serde_json::Value = row.try_get("metadata").map_err(|e| DevOpsError::internal(e.to_string()))?;

    Ok(RepositoryEvent {
        id: EventId::from_stored(id),
        kind: parse_event_kind(&kind)?,
        repository: RepositoryRef::new(repository)?,
        branch: row.try_get("branch").ok(),
        commit_hash: row.try_get("commit_hash").ok(),
        author: row.try_get("author").ok(),
        message: row.try_get("message").ok(),
        files_changed: serde_json::from_value(files_changed).unwrap_or_default(),
        timestamp: row.try_get("occurred_at").map_err(|e| DevOpsError::internal(e.to_string()))?,
        metadata: serde_json::from_value::<HashMap<String, serde_json::Value>>(metadata).unwrap_or_default(),
    })
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn save(&self, event: &RepositoryEvent) -> Result<(), DevOpsError> {
        sqlx::query(
            "INSERT INTO repository_events
                (id, kind, repository, branch, commit_hash, author, message, files_changed, occurred_at, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(event.id.to_string())
        .bind(event.kind.as_str())
        .bind(event.repository.as_str())
        .bind(&event.branch)
        .bind(&event.commit_hash)
        .bind(&event.author)
        .bind(&event.message)
        .bind(serde_json::to_value(&event.files_changed).unwrap_or_default())
        .bind(event.timestamp)
        .bind(serde_json::to_value(&event.metadata).unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to save event: {e}")))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<RepositoryEvent>, DevOpsError> {
        let row = sqlx::query("SELECT * FROM repository_events WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to query event: {e}")))?;
        row.as_ref().map(row_to_event).transpose()
    }

    async fn list_recent(&self, repository: &RepositoryRef, limit: usize) -> Result<Vec<RepositoryEvent>, DevOpsError> {
        let rows = sqlx::query(
            "SELECT * FROM repository_events WHERE repository = $1 ORDER BY occurred_at DESC LIMIT $2",
        )
        .bind(repository.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to list events: {e}")))?;
        rows.iter().map(row_to_event).collect()
    }

    async fn exists(&self, id: &EventId) -> Result<bool, DevOpsError> {
        let row = sqlx::query("SELECT 1 AS present FROM repository_events WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to check event existence: {e}")))?;
        Ok(row.is_some())
    }
}
