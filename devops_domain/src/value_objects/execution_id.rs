// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Execution and Operation Identifier Value Objects

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::error::DevOpsError;

macro_rules! ulid_id {
    ($name:ident, $marker:ident, $category:expr) => {
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        pub struct $name(GenericId<$marker>);

        #[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        struct $marker;

        impl IdCategory for $marker {
            fn category_name() -> &'static str {
                $category
            }
        }

        impl $name {
            pub fn new() -> Self {
                Self(GenericId::new())
            }

            pub fn from_string(s: &str) -> Result<Self, DevOpsError> {
                Ok(Self(GenericId::from_string(s)?))
            }

            pub fn from_ulid(ulid: Ulid) -> Result<Self, DevOpsError> {
                Ok(Self(GenericId::from_ulid(ulid)?))
            }

            pub fn timestamp_ms(&self) -> u64 {
                self.0.timestamp_ms()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

ulid_id!(ExecutionId, ExecutionMarker, "execution");
ulid_id!(OperationId, OperationMarker, "operation");
ulid_id!(StageResultId, StageResultMarker, "stage_result");
ulid_id!(NotificationId, NotificationMarker, "notification");
ulid_id!(QualityGateExecutionId, QualityGateExecutionMarker, "quality_gate_execution");
ulid_id!(AuditLogId, AuditLogMarker, "audit_log");
ulid_id!(TaskId, TaskMarker, "task");
