// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CI/CD Connector Contract
//!
//! The port every CI/CD platform adapter implements. Ported from
//! `BaseCICDConnector`: four operations common to every platform
//! (discover, trigger, poll status, cancel) plus a health check the
//! universal pipeline manager uses to decide whether a connector is usable
//! before attempting to register its workflows.

use async_trait::async_trait;

use crate::entities::connector::{ConnectorStatus, TriggerResult, UniversalWorkflowInfo};
use crate::error::DevOpsError;
use crate::value_objects::{PlatformType, RepositoryRef, WorkflowRef};

#[async_trait]
pub trait CiCdConnector: Send + Sync {
    fn platform_type(&self) -> PlatformType;

    async fn discover_workflows(&self, repository: &RepositoryRef) -> Result<Vec<UniversalWorkflowInfo>, DevOpsError>;

    async fn trigger_workflow(
        &self,
        repository: &RepositoryRef,
        workflow_id: &WorkflowRef,
        branch: &str,
        inputs: serde_json::Value,
    ) -> Result<TriggerResult, DevOpsError>;

    async fn get_workflow_status(
        &self,
        repository: &RepositoryRef,
        workflow_id: &WorkflowRef,
        run_id: Option<&WorkflowRef>,
    ) -> Result<UniversalWorkflowInfo, DevOpsError>;

    async fn cancel_workflow(&self, repository: &RepositoryRef, run_id: &WorkflowRef) -> Result<bool, DevOpsError>;

    async fn connector_status(&self) -> Result<ConnectorStatus, DevOpsError>;
}
