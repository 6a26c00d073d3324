// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Log and System Configuration Entities
//!
//! Every mutating operation against the pipeline registry, coordinator, and
//! workflow orchestrator appends an [`AuditLogEntry`]. `SystemConfiguration`
//! rows back the retention-policy overrides and coordination rule storage
//! read by the relational store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::AuditLogId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub actor: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn record(
        actor: impl Into<String>,
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        detail: Value,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            actor: actor.into(),
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            detail,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfiguration {
    pub config_key: String,
    pub config_value: Value,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}
