// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Retention Policy Value Object
//!
//! Describes how long rows in a given table are kept, read from the
//! `system_configuration` table under keys of the form
//! `data_retention_<table>_days`, mirroring migration `002` in the
//! relational store this was distilled from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub table: String,
    pub retention_days: u32,
}

impl RetentionPolicy {
    pub fn config_key(table: &str) -> String {
        format!("data_retention_{table}_days")
    }

    /// Builds the DELETE clause cutoff description. `%d` in a templated
    /// retention message expands to `retention_days`, matching the
    /// original's templated cleanup log message.
    pub fn expand_template(&self, template: &str) -> String {
        template.replace("%d", &self.retention_days.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_day_count() {
        let policy = RetentionPolicy {
            table: "workflow_executions".into(),
            retention_days: 90,
        };
        assert_eq!(
            policy.expand_template("deleting rows older than %d days"),
            "deleting rows older than 90 days"
        );
    }
}
