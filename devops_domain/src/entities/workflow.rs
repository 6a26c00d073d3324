// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Workflow Definition and Execution Entities
//!
//! `WorkflowDefinition` is a static DAG of named stages with declared
//! dependencies; `WorkflowExecution` tracks one run of that DAG, including a
//! [`StageResult`] per completed stage. The workflow orchestrator (§4.G)
//! drives executions forward by finding stages whose dependencies have all
//! completed — the classic topological-readiness scheduling loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::DevOpsError;
use crate::value_objects::{ExecutionId, StageResultId, WorkflowStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    pub depends_on: Vec<String>,
    pub retry_limit: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub stages: Vec<StageDefinition>,
}

impl WorkflowDefinition {
    /// Validates that every `depends_on` reference names a stage in this
    /// definition and that the dependency graph is acyclic.
    pub fn validate(&self) -> Result<(), DevOpsError> {
        let names: HashSet<&str> = self.stages.iter().map(|s| s.name.as_str()).collect();
        for stage in &self.stages {
            for dep in &stage.depends_on {
                if !names.contains(dep.as_str()) {
                    return Err(DevOpsError::validation(format!(
                        "stage '{}' depends on unknown stage '{dep}'",
                        stage.name
                    )));
                }
            }
        }
        self.topological_order().map(|_| ())
    }

    /// Kahn's algorithm: repeatedly peel off stages with no unresolved
    /// dependencies. A cycle is detected when stages remain but none are
    /// ready.
    pub fn topological_order(&self) -> Result<Vec<String>, DevOpsError> {
        let mut remaining: HashMap<&str, &StageDefinition> =
            self.stages.iter().map(|s| (s.name.as_str(), s)).collect();
        let mut done: HashSet<String> = HashSet::new();
        let mut order = Vec::with_capacity(self.stages.len());

        while !remaining.is_empty() {
            let ready: Vec<&str> = remaining
                .values()
                .filter(|s| s.depends_on.iter().all(|d| done.contains(d)))
                .map(|s| s.name.as_str())
                .collect();

            if ready.is_empty() {
                return Err(DevOpsError::validation(format!(
                    "cycle detected among stages: {:?}",
                    remaining.keys().collect::<Vec<_>>()
                )));
            }

            for name in ready {
                done.insert(name.to_string());
                order.push(name.to_string());
                remaining.remove(name);
            }
        }
        Ok(order)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub id: StageResultId,
    pub stage_name: String,
    pub status: WorkflowStatus,
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: ExecutionId,
    pub definition_name: String,
    pub status: WorkflowStatus,
    pub stage_results: Vec<StageResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowExecution {
    pub fn start(definition_name: impl Into<String>) -> Self {
        Self {
            id: ExecutionId::new(),
            definition_name: definition_name.into(),
            status: WorkflowStatus::Running,
            stage_results: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn completed_stage_names(&self) -> HashSet<&str> {
        self.stage_results
            .iter()
            .filter(|r| r.status == WorkflowStatus::Success)
            .map(|r| r.stage_name.as_str())
            .collect()
    }

    pub fn has_failed_stage(&self) -> bool {
        self.stage_results
            .iter()
            .any(|r| matches!(r.status, WorkflowStatus::Failed | WorkflowStatus::Timeout))
    }

    pub fn finish(&mut self, status: WorkflowStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, deps: &[&str]) -> StageDefinition {
        StageDefinition {
            name: name.into(),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            retry_limit: 0,
            timeout_secs: 60,
        }
    }

    #[test]
    fn topological_order_respects_dependencies() {
        let def = WorkflowDefinition {
            name: "ci".into(),
            stages: vec![stage("build", &[]), stage("test", &["build"]), stage("deploy", &["test"])],
        };
        let order = def.topological_order().unwrap();
        assert_eq!(order, vec!["build", "test", "deploy"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let def = WorkflowDefinition {
            name: "broken".into(),
            stages: vec![stage("a", &["b"]), stage("b", &["a"])],
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let def = WorkflowDefinition {
            name: "broken".into(),
            stages: vec![stage("a", &["missing"])],
        };
        assert!(def.validate().is_err());
    }
}
