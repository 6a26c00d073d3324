// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Migration Manager
//!
//! Ported from `migration_manager.py`: migrations are ordered, versioned
//! Rust values carrying their own `up_sql`/`down_sql` and an integrity
//! checksum (SHA-256 over `up_sql`), recorded in a `schema_migrations`
//! table as they apply. On startup, any migration already recorded is
//! re-hashed and compared against its checksum; a mismatch means the
//! migration's SQL changed after it was applied somewhere, which is a
//! deployment error the manager refuses to silently paper over.

use sha2::{Digest, Sha256};
use sqlx::{postgres::PgPool, Row};

use devops_domain::error::DevOpsError;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up_sql: &'static str,
    pub down_sql: &'static str,
}

impl Migration {
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.up_sql.as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub struct MigrationManager<'a> {
    pool: &'a PgPool,
    migrations: Vec<Migration>,
}

impl<'a> MigrationManager<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            migrations: default_migrations(),
        }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DevOpsError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                checksum TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to create schema_migrations: {e}")))?;
        Ok(())
    }

    /// Applies every migration whose version is not yet recorded, in
    /// ascending order. Recorded migrations are checksum-verified first.
    pub async fn migrate(&self) -> Result<Vec<i64>, DevOpsError> {
        self.ensure_migrations_table().await?;

        let applied_rows = sqlx::query("SELECT version, checksum FROM schema_migrations")
            .fetch_all(self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to read schema_migrations: {e}")))?;

        let mut applied = std::collections::HashMap::new();
        for row in &applied_rows {
            let version: i64 = row.try_get("version").unwrap_or_default();
            let checksum: String = row.try_get("checksum").unwrap_or_default();
            applied.insert(version, checksum);
        }

        for migration in &self.migrations {
            if let Some(recorded_checksum) = applied.get(&migration.version) {
                if recorded_checksum != &migration.checksum() {
                    return Err(DevOpsError::corruption(format!(
                        "migration {} ('{}') checksum mismatch: recorded schema no longer matches its source",
                        migration.version, migration.name
                    )));
                }
            }
        }

        let mut newly_applied = Vec::new();
        for migration in &self.migrations {
            if applied.contains_key(&migration.version) {
                continue;
            }
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| DevOpsError::internal(format!("failed to start transaction: {e}")))?;

            sqlx::raw_sql(migration.up_sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DevOpsError::internal(format!(
                        "migration {} ('{}') failed: {e}",
                        migration.version, migration.name
                    ))
                })?;

            sqlx::query("INSERT INTO schema_migrations (version, name, checksum) VALUES ($1, $2, $3)")
                .bind(migration.version)
                .bind(migration.name)
                .bind(migration.checksum())
                .execute(&mut *tx)
                .await
                .map_err(|e| DevOpsError::internal(format!("failed to record migration: {e}")))?;

            tx.commit()
                .await
                .map_err(|e| DevOpsError::internal(format!("failed to commit migration: {e}")))?;

            newly_applied.push(migration.version);
        }

        Ok(newly_applied)
    }
}

fn default_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "repository_events",
            up_sql: "CREATE TABLE IF NOT EXISTS repository_events (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                repository TEXT NOT NULL,
                branch TEXT,
                commit_hash TEXT,
                author TEXT,
                message TEXT,
                files_changed JSONB NOT NULL DEFAULT '[]',
                occurred_at TIMESTAMPTZ NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{}'
            );
            CREATE INDEX IF NOT EXISTS idx_repository_events_repo ON repository_events (repository, occurred_at DESC);",
            down_sql: "DROP TABLE IF EXISTS repository_events;",
        },
        Migration {
            version: 2,
            name: "pipeline_registry",
            up_sql: "CREATE TABLE IF NOT EXISTS pipeline_registry (
                pipeline_id TEXT PRIMARY KEY,
                platform TEXT NOT NULL,
                repository TEXT NOT NULL,
                workflow_name TEXT NOT NULL,
                success_rate DOUBLE PRECISION NOT NULL DEFAULT 1.0,
                avg_duration_secs DOUBLE PRECISION NOT NULL DEFAULT 0.0,
                total_runs BIGINT NOT NULL DEFAULT 0,
                last_run_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_pipeline_registry_repo ON pipeline_registry (repository);",
            down_sql: "DROP TABLE IF EXISTS pipeline_registry;",
        },
        Migration {
            version: 3,
            name: "workflow_executions",
            up_sql: "CREATE TABLE IF NOT EXISTS workflow_executions (
                id TEXT PRIMARY KEY,
                definition_name TEXT NOT NULL,
                status TEXT NOT NULL,
                stage_results JSONB NOT NULL DEFAULT '[]',
                started_at TIMESTAMPTZ NOT NULL,
                finished_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_workflow_executions_def ON workflow_executions (definition_name, started_at DESC);",
            down_sql: "DROP TABLE IF EXISTS workflow_executions;",
        },
        Migration {
            version: 4,
            name: "audit_log",
            up_sql: "CREATE TABLE IF NOT EXISTS audit_log (
                id TEXT PRIMARY KEY,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                resource_type TEXT NOT NULL,
                resource_id TEXT NOT NULL,
                detail JSONB NOT NULL DEFAULT '{}',
                occurred_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_log_resource ON audit_log (resource_type, occurred_at DESC);",
            down_sql: "DROP TABLE IF EXISTS audit_log;",
        },
        Migration {
            version: 5,
            name: "system_configuration",
            up_sql: "CREATE TABLE IF NOT EXISTS system_configuration (
                config_key TEXT PRIMARY KEY,
                config_value JSONB NOT NULL,
                description TEXT,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            INSERT INTO system_configuration (config_key, config_value, description) VALUES
                ('data_retention_repository_events_days', '90', 'days to keep repository_events rows'),
                ('data_retention_audit_log_days', '365', 'days to keep audit_log rows')
            ON CONFLICT (config_key) DO NOTHING;",
            down_sql: "DROP TABLE IF EXISTS system_configuration;",
        },
        Migration {
            version: 6,
            name: "workflow_stage_results",
            up_sql: "CREATE TABLE IF NOT EXISTS workflow_stage_results (
                id TEXT PRIMARY KEY,
                execution_id TEXT NOT NULL REFERENCES workflow_executions (id) ON DELETE CASCADE,
                stage_name TEXT NOT NULL,
                status TEXT NOT NULL,
                attempt INTEGER NOT NULL DEFAULT 1,
                started_at TIMESTAMPTZ NOT NULL,
                finished_at TIMESTAMPTZ,
                error TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_workflow_stage_results_execution ON workflow_stage_results (execution_id, started_at);",
            down_sql: "DROP TABLE IF EXISTS workflow_stage_results;",
        },
        Migration {
            version: 7,
            name: "devops_metrics",
            up_sql: "CREATE TABLE IF NOT EXISTS devops_metrics (
                id BIGSERIAL PRIMARY KEY,
                pipeline_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                metric_name TEXT NOT NULL,
                value DOUBLE PRECISION NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_devops_metrics_pipeline ON devops_metrics (pipeline_id, recorded_at DESC);",
            down_sql: "DROP TABLE IF EXISTS devops_metrics;",
        },
        Migration {
            version: 8,
            name: "quality_gate_executions",
            up_sql: "CREATE TABLE IF NOT EXISTS quality_gate_executions (
                id TEXT PRIMARY KEY,
                gate_name TEXT NOT NULL,
                observed_value DOUBLE PRECISION NOT NULL,
                passed BOOLEAN NOT NULL,
                evaluated_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quality_gate_executions_gate ON quality_gate_executions (gate_name, evaluated_at DESC);",
            down_sql: "DROP TABLE IF EXISTS quality_gate_executions;",
        },
        Migration {
            version: 9,
            name: "pipeline_executions",
            up_sql: "CREATE TABLE IF NOT EXISTS pipeline_executions (
                id TEXT PRIMARY KEY,
                pipeline_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                run_id TEXT,
                status TEXT NOT NULL,
                started_at TIMESTAMPTZ NOT NULL,
                finished_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_pipeline_executions_pipeline ON pipeline_executions (pipeline_id, started_at DESC);",
            down_sql: "DROP TABLE IF EXISTS pipeline_executions;",
        },
        Migration {
            version: 10,
            name: "risk_assessments",
            up_sql: "CREATE TABLE IF NOT EXISTS risk_assessments (
                id TEXT PRIMARY KEY,
                repository TEXT NOT NULL,
                probability DOUBLE PRECISION NOT NULL,
                confidence DOUBLE PRECISION NOT NULL,
                top_factors JSONB NOT NULL DEFAULT '[]',
                assessed_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_risk_assessments_repo ON risk_assessments (repository, assessed_at DESC);",
            down_sql: "DROP TABLE IF EXISTS risk_assessments;",
        },
        Migration {
            version: 11,
            name: "deployments",
            up_sql: "CREATE TABLE IF NOT EXISTS deployments (
                id TEXT PRIMARY KEY,
                repository TEXT NOT NULL,
                environment TEXT NOT NULL,
                platform TEXT NOT NULL,
                status TEXT NOT NULL,
                deployed_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_deployments_repo ON deployments (repository, deployed_at DESC);",
            down_sql: "DROP TABLE IF EXISTS deployments;",
        },
        Migration {
            version: 12,
            name: "notifications",
            up_sql: "CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                channel TEXT NOT NULL,
                severity TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notifications_created ON notifications (created_at DESC);",
            down_sql: "DROP TABLE IF EXISTS notifications;",
        },
        Migration {
            version: 13,
            name: "analytics_aggregations",
            up_sql: "CREATE TABLE IF NOT EXISTS analytics_aggregations (
                id BIGSERIAL PRIMARY KEY,
                repository TEXT NOT NULL,
                aggregation_key TEXT NOT NULL,
                payload JSONB NOT NULL,
                computed_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_analytics_aggregations_repo ON analytics_aggregations (repository, aggregation_key, computed_at DESC);",
            down_sql: "DROP TABLE IF EXISTS analytics_aggregations;",
        },
        Migration {
            version: 14,
            name: "webhook_deliveries",
            up_sql: "CREATE TABLE IF NOT EXISTS webhook_deliveries (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                event_type TEXT NOT NULL,
                payload JSONB NOT NULL,
                received_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_webhook_deliveries_received ON webhook_deliveries (received_at DESC);",
            down_sql: "DROP TABLE IF EXISTS webhook_deliveries;",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_for_identical_sql() {
        let m = Migration {
            version: 1,
            name: "x",
            up_sql: "CREATE TABLE x (id TEXT);",
            down_sql: "DROP TABLE x;",
        };
        assert_eq!(m.checksum(), m.checksum());
    }

    #[test]
    fn checksum_differs_for_different_sql() {
        let a = Migration { version: 1, name: "x", up_sql: "A", down_sql: "" };
        let b = Migration { version: 1, name: "x", up_sql: "B", down_sql: "" };
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn default_migrations_have_unique_versions() {
        let versions: std::collections::HashSet<_> = default_migrations().iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), default_migrations().len());
    }
}
