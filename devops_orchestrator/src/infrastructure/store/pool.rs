// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Postgres Connection Pool

use sqlx::postgres::{PgPool, PgPoolOptions};

use devops_domain::error::DevOpsError;

/// Opens a bounded connection pool against `database_url`. Pool exhaustion
/// surfaces as [`DevOpsError::unavailable`] so the background task fabric
/// treats it as transient and retries.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, DevOpsError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| DevOpsError::unavailable(format!("failed to connect to relational store: {e}")))
}
