// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Log Repository Contract

use async_trait::async_trait;

use crate::entities::AuditLogEntry;
use crate::error::DevOpsError;

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DevOpsError>;

    async fn list_recent(&self, resource_type: &str, limit: usize) -> Result<Vec<AuditLogEntry>, DevOpsError>;
}
