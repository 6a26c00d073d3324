// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Integration tests driving the workflow orchestrator and pipeline manager
//! against in-memory repository and connector doubles, with no database or
//! network required.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use devops_domain::entities::connector::{ConnectorStatus, TriggerResult, UniversalWorkflowInfo};
use devops_domain::entities::{StageDefinition, WorkflowDefinition, WorkflowExecution};
use devops_domain::error::DevOpsError;
use devops_domain::repositories::{PipelineRegistryRepository, WorkflowExecutionRepository};
use devops_domain::value_objects::{ExecutionId, PipelineId, PlatformType, RepositoryRef, WorkflowRef, WorkflowStatus};

use devops_orchestrator::application::services::{TaskFabric, UniversalPipelineManager, WorkflowOrchestrator};

#[derive(Default)]
struct InMemoryExecutions {
    saved: Mutex<Vec<WorkflowExecution>>,
}

#[async_trait]
impl WorkflowExecutionRepository for InMemoryExecutions {
    async fn save(&self, execution: &WorkflowExecution) -> Result<(), DevOpsError> {
        let mut saved = self.saved.lock().unwrap();
        if let Some(existing) = saved.iter_mut().find(|e| e.id == execution.id) {
            *existing = execution.clone();
        } else {
            saved.push(execution.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<WorkflowExecution>, DevOpsError> {
        Ok(self.saved.lock().unwrap().iter().find(|e| &e.id == id).cloned())
    }

    async fn list_recent(&self, definition_name: &str, limit: usize) -> Result<Vec<WorkflowExecution>, DevOpsError> {
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.definition_name == definition_name)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_recent_all(&self, limit: usize) -> Result<Vec<WorkflowExecution>, DevOpsError> {
        Ok(self.saved.lock().unwrap().iter().take(limit).cloned().collect())
    }
}

#[tokio::test]
async fn orchestrator_runs_a_three_stage_dag_to_success() {
    let executions = Arc::new(InMemoryExecutions::default());
    let fabric = TaskFabric::spawn(None);
    let orchestrator = WorkflowOrchestrator::new(executions.clone(), fabric);

    let definition = WorkflowDefinition {
        name: "build-test-deploy".to_string(),
        stages: vec![
            StageDefinition { name: "build".to_string(), depends_on: vec![], retry_limit: 0, timeout_secs: 60 },
            StageDefinition { name: "test".to_string(), depends_on: vec!["build".to_string()], retry_limit: 0, timeout_secs: 60 },
            StageDefinition { name: "deploy".to_string(), depends_on: vec!["test".to_string()], retry_limit: 0, timeout_secs: 60 },
        ],
    };

    let mut handlers = HashMap::new();
    for stage in ["build", "test", "deploy"] {
        handlers.insert(
            stage.to_string(),
            Arc::new(|_token: CancellationToken| Box::pin(async move { Ok(()) }) as futures::future::BoxFuture<'static, Result<(), DevOpsError>>)
                as devops_orchestrator::application::services::workflow_orchestrator::StageHandler,
        );
    }

    let execution = orchestrator.run(definition, handlers, CancellationToken::new()).await.unwrap();

    assert_eq!(execution.status, WorkflowStatus::Success);
    assert_eq!(execution.stage_results.len(), 3);
    assert_eq!(executions.list_recent("build-test-deploy", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn orchestrator_stops_the_dag_on_first_failed_stage() {
    let executions = Arc::new(InMemoryExecutions::default());
    let fabric = TaskFabric::spawn(None);
    let orchestrator = WorkflowOrchestrator::new(executions, fabric);

    let definition = WorkflowDefinition {
        name: "lint-then-build".to_string(),
        stages: vec![
            StageDefinition { name: "lint".to_string(), depends_on: vec![], retry_limit: 0, timeout_secs: 30 },
            StageDefinition { name: "build".to_string(), depends_on: vec!["lint".to_string()], retry_limit: 0, timeout_secs: 30 },
        ],
    };

    let mut handlers: HashMap<String, devops_orchestrator::application::services::workflow_orchestrator::StageHandler> = HashMap::new();
    handlers.insert(
        "lint".to_string(),
        Arc::new(|_token: CancellationToken| {
            Box::pin(async move { Err(DevOpsError::validation("lint found 3 errors")) }) as futures::future::BoxFuture<'static, Result<(), DevOpsError>>
        }),
    );
    handlers.insert(
        "build".to_string(),
        Arc::new(|_token: CancellationToken| Box::pin(async move { Ok(()) }) as futures::future::BoxFuture<'static, Result<(), DevOpsError>>),
    );

    let execution = orchestrator.run(definition, handlers, CancellationToken::new()).await.unwrap();

    assert_eq!(execution.status, WorkflowStatus::Failed);
    assert_eq!(execution.stage_results.len(), 1);
    assert_eq!(execution.stage_results[0].stage_name, "lint");
}

struct FakeRegistry {
    entries: Mutex<HashMap<PipelineId, devops_domain::entities::PipelineRegistryEntry>>,
}

#[async_trait]
impl PipelineRegistryRepository for FakeRegistry {
    async fn upsert(&self, entry: &devops_domain::entities::PipelineRegistryEntry) -> Result<(), DevOpsError> {
        self.entries.lock().unwrap().insert(entry.pipeline_id.clone(), entry.clone());
        Ok(())
    }

    async fn get(&self, id: &PipelineId) -> Result<Option<devops_domain::entities::PipelineRegistryEntry>, DevOpsError> {
        Ok(self.entries.lock().unwrap().get(id).cloned())
    }

    async fn list_by_platform(&self, platform: PlatformType) -> Result<Vec<devops_domain::entities::PipelineRegistryEntry>, DevOpsError> {
        Ok(self.entries.lock().unwrap().values().filter(|e| e.platform == platform).cloned().collect())
    }

    async fn list_by_repository(&self, repository: &str) -> Result<Vec<devops_domain::entities::PipelineRegistryEntry>, DevOpsError> {
        Ok(self.entries.lock().unwrap().values().filter(|e| e.repository == repository).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<devops_domain::entities::PipelineRegistryEntry>, DevOpsError> {
        Ok(self.entries.lock().unwrap().values().cloned().collect())
    }
}

struct FakeConnector {
    workflows: Vec<UniversalWorkflowInfo>,
}

#[async_trait]
impl devops_domain::services::CiCdConnector for FakeConnector {
    fn platform_type(&self) -> PlatformType {
        PlatformType::GithubActions
    }

    async fn discover_workflows(&self, _repository: &RepositoryRef) -> Result<Vec<UniversalWorkflowInfo>, DevOpsError> {
        Ok(self.workflows.clone())
    }

    async fn trigger_workflow(
        &self,
        _repository: &RepositoryRef,
        workflow_id: &WorkflowRef,
        _branch: &str,
        _inputs: serde_json::Value,
    ) -> Result<TriggerResult, DevOpsError> {
        Ok(TriggerResult {
            success: true,
            workflow_id: Some(workflow_id.clone()),
            run_id: Some(WorkflowRef::Numeric(42)),
            url: None,
            error: None,
            metadata: HashMap::new(),
        })
    }

    async fn get_workflow_status(
        &self,
        _repository: &RepositoryRef,
        _workflow_id: &WorkflowRef,
        _run_id: Option<&WorkflowRef>,
    ) -> Result<UniversalWorkflowInfo, DevOpsError> {
        self.workflows.first().cloned().ok_or_else(|| DevOpsError::not_found("no workflow"))
    }

    async fn cancel_workflow(&self, _repository: &RepositoryRef, _run_id: &WorkflowRef) -> Result<bool, DevOpsError> {
        Ok(true)
    }

    async fn connector_status(&self) -> Result<ConnectorStatus, DevOpsError> {
        Ok(ConnectorStatus { platform: PlatformType::GithubActions, status: "ok".to_string(), connected: true, rate_limit_remaining: None })
    }
}

#[tokio::test]
async fn pipeline_manager_discovers_and_registers_workflows_from_a_connector() {
    let registry = Arc::new(FakeRegistry { entries: Mutex::new(HashMap::new()) });
    let repository = RepositoryRef::new("acme/widgets").unwrap();

    let mut connectors: HashMap<PlatformType, Arc<dyn devops_domain::services::CiCdConnector>> = HashMap::new();
    connectors.insert(
        PlatformType::GithubActions,
        Arc::new(FakeConnector {
            workflows: vec![UniversalWorkflowInfo {
                id: WorkflowRef::Named("ci.yml".to_string()),
                name: "CI".to_string(),
                platform: PlatformType::GithubActions,
                status: WorkflowStatus::Unknown,
                repository: repository.clone(),
                branch: "main".to_string(),
                commit_sha: "deadbeef".to_string(),
                url: "https://github.com/acme/widgets/actions".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                metadata: HashMap::new(),
            }],
        }),
    );

    let manager = UniversalPipelineManager::new(registry.clone(), connectors, Vec::new());
    let discovered = manager.discover_all_workflows(&repository).await.unwrap();

    assert_eq!(discovered, 1);
    assert_eq!(registry.list_by_platform(PlatformType::GithubActions).await.unwrap().len(), 1);
}
