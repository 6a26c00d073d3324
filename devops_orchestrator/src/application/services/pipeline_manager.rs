// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Universal Pipeline Manager
//!
//! Ported from `universal_pipeline_manager.py`'s `PipelineRegistry`,
//! `CrossPlatformCoordinator`, and `UniversalPipelineManager`. The registry
//! is the repository-backed source of truth for every discovered workflow
//! across platforms; the coordinator guards against two operations racing
//! on the same (repository, platform) pair with an in-process resource
//! lock map, then runs configured [`CoordinationRule`]s once a reservation
//! succeeds.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use devops_domain::entities::{CrossPlatformOperation, PipelineRegistryEntry, TriggerResult};
use devops_domain::error::DevOpsError;
use devops_domain::repositories::PipelineRegistryRepository;
use devops_domain::services::CiCdConnector;
use devops_domain::value_objects::{CoordinationRule, PipelineId, PlatformType, RepositoryRef, RuleAction, WorkflowRef, WorkflowStatus};

/// Keys the in-process resource lock map: an operation reserves every
/// (repository, platform) pair it touches before proceeding, and releases
/// them on every exit path.
type ResourceKey = (RepositoryRef, PlatformType);

pub struct CrossPlatformCoordinator {
    locks: Mutex<HashMap<ResourceKey, HashSet<String>>>,
    rules: Vec<CoordinationRule>,
}

impl CrossPlatformCoordinator {
    pub fn new(rules: Vec<CoordinationRule>) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            rules,
        }
    }

    /// Attempts to reserve every (repository, platform) pair an operation
    /// needs. Reservation is all-or-nothing: if any pair is already held by
    /// a different operation, nothing is reserved and the conflicting keys
    /// are reported.
    fn try_reserve(&self, operation_id: &str, repository: &RepositoryRef, platforms: &[PlatformType]) -> Result<(), Vec<ResourceKey>> {
        let mut locks = self.locks.lock();
        let conflicts: Vec<ResourceKey> = platforms
            .iter()
            .map(|p| (repository.clone(), *p))
            .filter(|key| locks.get(key).is_some_and(|holders| !holders.is_empty() && !holders.contains(operation_id)))
            .collect();

        if !conflicts.is_empty() {
            return Err(conflicts);
        }

        for platform in platforms {
            locks
                .entry((repository.clone(), *platform))
                .or_default()
                .insert(operation_id.to_string());
        }
        Ok(())
    }

    fn release(&self, operation_id: &str, repository: &RepositoryRef, platforms: &[PlatformType]) {
        let mut locks = self.locks.lock();
        for platform in platforms {
            if let Some(holders) = locks.get_mut(&(repository.clone(), *platform)) {
                holders.remove(operation_id);
            }
        }
    }

    /// Runs every enabled rule whose condition matches, returning the
    /// actions that fired (for the caller to execute: delay the operation
    /// or emit a log line). Rules with unrecognized actions are silently
    /// skipped per [`CoordinationRule::action_kind`]'s contract.
    fn fired_actions(&self, platforms: &[PlatformType], repository: &RepositoryRef) -> Vec<RuleAction> {
        self.rules
            .iter()
            .filter(|r| r.enabled && r.condition_matches(platforms, repository))
            .map(|r| r.action_kind())
            .filter(|a| *a != RuleAction::NoOp)
            .collect()
    }

    /// Runs `body` while holding locks over every (repository, platform)
    /// pair the operation declares, releasing them on every exit path
    /// (success, error, or panic unwind via the guard's `Drop`).
    pub async fn coordinate<F, Fut, T>(
        &self,
        mut operation: CrossPlatformOperation,
        body: F,
    ) -> (CrossPlatformOperation, Result<T, DevOpsError>)
    where
        F: FnOnce(Vec<RuleAction>) -> Fut,
        Fut: std::future::Future<Output = Result<T, DevOpsError>>,
    {
        let operation_id = operation.id.to_string();
        if let Err(conflicts) = self.try_reserve(&operation_id, &operation.repository, &operation.platforms) {
            operation.fail_with_conflict(format!("resource locks held for {} platform(s)", conflicts.len()));
            return (operation, Err(DevOpsError::conflict("cross-platform resource lock held")));
        }

        let actions = self.fired_actions(&operation.platforms, &operation.repository);
        let result = body(actions).await;
        self.release(&operation_id, &operation.repository, &operation.platforms);

        match &result {
            Ok(_) => operation.succeed(),
            Err(e) => operation.fail_with_coordination_error(e.to_string()),
        }
        (operation, result)
    }
}

/// Ties the registry, coordinator, and per-platform connectors together
/// into the single entry point the presentation layer calls.
pub struct UniversalPipelineManager {
    registry: Arc<dyn PipelineRegistryRepository>,
    connectors: HashMap<PlatformType, Arc<dyn CiCdConnector>>,
    pub coordinator: CrossPlatformCoordinator,
}

impl UniversalPipelineManager {
    pub fn new(
        registry: Arc<dyn PipelineRegistryRepository>,
        connectors: HashMap<PlatformType, Arc<dyn CiCdConnector>>,
        coordination_rules: Vec<CoordinationRule>,
    ) -> Self {
        Self {
            registry,
            connectors,
            coordinator: CrossPlatformCoordinator::new(coordination_rules),
        }
    }

    /// Discovers every workflow across every registered connector for one
    /// repository and upserts a registry entry per workflow, matching
    /// `discover_all_workflows`'s dedup-by-pipeline_id semantics.
    pub async fn discover_all_workflows(&self, repository: &RepositoryRef) -> Result<usize, DevOpsError> {
        let mut discovered = 0usize;
        for (platform, connector) in &self.connectors {
            let workflows = connector.discover_workflows(repository).await?;
            for workflow in workflows {
                let pipeline_id = PipelineId::compose(*platform, repository, &workflow.id);
                let entry = PipelineRegistryEntry::new(
                    pipeline_id,
                    *platform,
                    repository.as_str().to_string(),
                    workflow.name,
                );
                self.registry.upsert(&entry).await?;
                discovered += 1;
            }
        }
        Ok(discovered)
    }

    pub fn connector_for(&self, platform: PlatformType) -> Option<Arc<dyn CiCdConnector>> {
        self.connectors.get(&platform).cloned()
    }

    pub fn registry(&self) -> &Arc<dyn PipelineRegistryRepository> {
        &self.registry
    }

    /// Coordinates a trigger across every named platform: the coordinator
    /// reserves (repository, platform) locks for the whole operation, then
    /// each platform's registered pipeline for this repository is triggered
    /// through its connector. A platform with no registered pipeline for
    /// this repository is skipped rather than failing the whole operation.
    pub async fn trigger_cross_platform_workflows(
        &self,
        repository: &RepositoryRef,
        platforms: &[PlatformType],
        branch: &str,
        inputs: serde_json::Value,
    ) -> (CrossPlatformOperation, Result<HashMap<PlatformType, TriggerResult>, DevOpsError>) {
        let operation = CrossPlatformOperation::start("trigger", repository.clone(), platforms.to_vec());
        self.coordinator
            .coordinate(operation, |_actions| async move {
                let entries = self.registry.list_by_repository(repository.as_str()).await?;
                let mut results = HashMap::new();
                for platform in platforms {
                    let Some(connector) = self.connectors.get(platform) else { continue };
                    let Some(entry) = entries.iter().find(|e| e.platform == *platform) else { continue };
                    let workflow_ref = WorkflowRef::Named(entry.workflow_name.clone());
                    let result = connector.trigger_workflow(repository, &workflow_ref, branch, inputs.clone()).await?;
                    results.insert(*platform, result);
                }
                Ok(results)
            })
            .await
    }

    /// Acts on registry entries currently running on any of the given
    /// platforms: queries each connector for the pipeline's live status and
    /// cancels it if still `Queued`/`Running`, returning the count actually
    /// cancelled.
    pub async fn cancel_cross_platform_workflows(
        &self,
        repository: &RepositoryRef,
        platforms: &[PlatformType],
    ) -> (CrossPlatformOperation, Result<usize, DevOpsError>) {
        let operation = CrossPlatformOperation::start("cancel", repository.clone(), platforms.to_vec());
        self.coordinator
            .coordinate(operation, |_actions| async move {
                let entries = self.registry.list_by_repository(repository.as_str()).await?;
                let mut cancelled = 0usize;
                for entry in entries.iter().filter(|e| platforms.contains(&e.platform)) {
                    let Some(connector) = self.connectors.get(&entry.platform) else { continue };
                    let workflow_ref = WorkflowRef::Named(entry.workflow_name.clone());
                    let info = connector.get_workflow_status(repository, &workflow_ref, None).await?;
                    if matches!(info.status, WorkflowStatus::Queued | WorkflowStatus::Running)
                        && connector.cancel_workflow(repository, &info.id).await?
                    {
                        cancelled += 1;
                    }
                }
                Ok(cancelled)
            })
            .await
    }

    /// Per-platform registration counts, rolled-up run totals, and a
    /// run-weighted overall success rate for one repository.
    pub async fn get_unified_status(&self, repository: &RepositoryRef) -> Result<UnifiedStatus, DevOpsError> {
        let entries = self.registry.list_by_repository(repository.as_str()).await?;
        Ok(UnifiedStatus::from_entries(&entries))
    }

    /// Aggregated rolling metrics across every platform registered for a
    /// repository: per-platform pipeline/run counts plus a run-weighted
    /// overall success rate and average duration.
    pub async fn get_cross_platform_analytics(&self, repository: &RepositoryRef) -> Result<CrossPlatformAnalytics, DevOpsError> {
        let entries = self.registry.list_by_repository(repository.as_str()).await?;
        let status = UnifiedStatus::from_entries(&entries);
        let total_runs: u64 = entries.iter().map(|e| e.total_runs).sum();
        let weighted_duration: f64 = entries.iter().map(|e| e.avg_duration_secs * e.total_runs as f64).sum();
        let overall_avg_duration_secs = if total_runs > 0 { weighted_duration / total_runs as f64 } else { 0.0 };
        Ok(CrossPlatformAnalytics { status, overall_avg_duration_secs })
    }

    /// Textual recommendations derived from [`get_cross_platform_analytics`],
    /// against the thresholds the original dashboard flags: a sub-90%
    /// overall success rate is high severity, an average duration over ten
    /// minutes is medium, and a >3-pipeline imbalance between the busiest
    /// and quietest platform is low.
    pub async fn optimize_pipeline_execution(&self, repository: &RepositoryRef) -> Result<Vec<OptimizationRecommendation>, DevOpsError> {
        let analytics = self.get_cross_platform_analytics(repository).await?;
        let mut recommendations = Vec::new();

        if analytics.status.overall_success_rate * 100.0 < 90.0 {
            recommendations.push(OptimizationRecommendation {
                severity: "high",
                message: format!(
                    "overall success rate {:.1}% is below the 90% threshold",
                    analytics.status.overall_success_rate * 100.0
                ),
            });
        }
        if analytics.overall_avg_duration_secs > 600.0 {
            recommendations.push(OptimizationRecommendation {
                severity: "medium",
                message: format!("average pipeline duration {:.0}s exceeds the 10-minute threshold", analytics.overall_avg_duration_secs),
            });
        }
        if let (Some(busiest), Some(quietest)) = (
            analytics.status.per_platform.values().max_by_key(|s| s.registered_pipelines),
            analytics.status.per_platform.values().min_by_key(|s| s.registered_pipelines),
        ) {
            let imbalance = busiest.registered_pipelines.saturating_sub(quietest.registered_pipelines);
            if imbalance > 3 {
                recommendations.push(OptimizationRecommendation {
                    severity: "low",
                    message: format!("pipeline registration is imbalanced across platforms by {imbalance} pipelines"),
                });
            }
        }
        Ok(recommendations)
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PlatformStatusSummary {
    pub registered_pipelines: usize,
    pub total_runs: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UnifiedStatus {
    pub per_platform: HashMap<String, PlatformStatusSummary>,
    pub overall_success_rate: f64,
}

impl UnifiedStatus {
    fn from_entries(entries: &[PipelineRegistryEntry]) -> Self {
        let mut per_platform: HashMap<String, PlatformStatusSummary> = HashMap::new();
        let mut weighted_success = 0.0;
        let mut weighted_total = 0u64;
        for entry in entries {
            let summary = per_platform.entry(entry.platform.as_str().to_string()).or_default();
            summary.registered_pipelines += 1;
            summary.total_runs += entry.total_runs;
            summary.success_rate = entry.success_rate;
            weighted_success += entry.success_rate * entry.total_runs as f64;
            weighted_total += entry.total_runs;
        }
        let overall_success_rate = if weighted_total > 0 { weighted_success / weighted_total as f64 } else { 1.0 };
        Self { per_platform, overall_success_rate }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CrossPlatformAnalytics {
    #[serde(flatten)]
    pub status: UnifiedStatus,
    pub overall_avg_duration_secs: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OptimizationRecommendation {
    pub severity: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo() -> RepositoryRef {
        RepositoryRef::new("org/repo").unwrap()
    }

    #[tokio::test]
    async fn second_operation_on_same_resource_conflicts() {
        let coordinator = CrossPlatformCoordinator::new(Vec::new());
        let op_a = CrossPlatformOperation::start("trigger", repo(), vec![PlatformType::GithubActions]);
        let op_b = CrossPlatformOperation::start("trigger", repo(), vec![PlatformType::GithubActions]);

        // Hold op_a's lock by reserving without releasing, simulating an
        // in-flight operation.
        coordinator.try_reserve(&op_a.id.to_string(), &op_a.repository, &op_a.platforms).unwrap();

        let (finished, result) = coordinator
            .coordinate(op_b, |_actions| async { Ok::<(), DevOpsError>(()) })
            .await;
        assert!(result.is_err());
        assert_eq!(finished.status, devops_domain::entities::cross_platform_operation::OperationStatus::Failed);
    }

    #[tokio::test]
    async fn unrelated_platform_does_not_conflict() {
        let coordinator = CrossPlatformCoordinator::new(vec![CoordinationRule {
            name: "always-log".into(),
            enabled: true,
            condition: json!({"type": "platform_count", "min_platforms": 1}),
            action: json!({"type": "log", "message": "fired"}),
        }]);
        let op = CrossPlatformOperation::start("trigger", repo(), vec![PlatformType::GitlabCi]);
        let (finished, result) = coordinator.coordinate(op, |actions| async move {
            assert_eq!(actions.len(), 1);
            Ok::<(), DevOpsError>(())
        }).await;
        assert!(result.is_ok());
        assert_eq!(finished.status, devops_domain::entities::cross_platform_operation::OperationStatus::Success);
    }
}
