// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Retention Policy Runner
//!
//! Reads `data_retention_<table>_days` entries out of `system_configuration`
//! and deletes rows older than that cutoff. Supports a dry-run mode that
//! only counts the rows that would be deleted, matching the original
//! `migration_manager.py` cleanup job's `--dry-run` flag.

use sqlx::{postgres::PgPool, Row};

use devops_domain::error::DevOpsError;
use devops_domain::value_objects::RetentionPolicy;

/// Tables eligible for retention-based cleanup, paired with the timestamp
/// column retention age is measured against.
const RETAINABLE_TABLES: &[(&str, &str)] = &[
    ("repository_events", "occurred_at"),
    ("audit_log", "occurred_at"),
    ("devops_metrics", "recorded_at"),
];

pub struct RetentionRunner<'a> {
    pool: &'a PgPool,
}

impl<'a> RetentionRunner<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn policy_for(&self, table: &str) -> Result<Option<RetentionPolicy>, DevOpsError> {
        let key = RetentionPolicy::config_key(table);
        let row = sqlx::query("SELECT config_value FROM system_configuration WHERE config_key = $1")
            .bind(&key)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to read retention policy for {table}: {e}")))?;

        Ok(row.and_then(|r| {
            let value: serde_json::Value = r.try_get("config_value").ok()?;
            let days = value.as_u64()?;
            Some(RetentionPolicy {
                table: table.to_string(),
                retention_days: days as u32,
            })
        }))
    }

    /// Applies every configured retention policy. In dry-run mode, returns
    /// the row count that *would* be deleted per table without deleting
    /// anything.
    pub async fn run(&self, dry_run: bool) -> Result<Vec<(String, u64)>, DevOpsError> {
        let mut results = Vec::new();
        for (table, column) in RETAINABLE_TABLES {
            let Some(policy) = self.policy_for(table).await? else {
                continue;
            };

            let count_sql = format!(
                "SELECT count(*) AS n FROM {table} WHERE {column} < now() - interval '{} days'",
                policy.retention_days
            );
            let affected: i64 = sqlx::query(&count_sql)
                .fetch_one(self.pool)
                .await
                .map_err(|e| DevOpsError::internal(format!("failed to count expired rows in {table}: {e}")))?
                .try_get("n")
                .unwrap_or(0);

            if !dry_run && affected > 0 {
                let delete_sql = format!(
                    "DELETE FROM {table} WHERE {column} < now() - interval '{} days'",
                    policy.retention_days
                );
                sqlx::query(&delete_sql)
                    .execute(self.pool)
                    .await
                    .map_err(|e| DevOpsError::internal(format!("failed to delete expired rows in {table}: {e}")))?;
            }

            results.push((table.to_string(), affected as u64));
        }
        Ok(results)
    }
}
