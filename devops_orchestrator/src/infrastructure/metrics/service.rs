// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics Service
//!
//! Wraps a Prometheus [`Registry`] with the counters, histograms, and gauges
//! the orchestrator publishes: pipeline triggers, workflow stage durations,
//! webhook deliveries, cross-platform coordination conflicts, and background
//! task fabric queue depths.

use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, HistogramVec, Registry, TextEncoder,
};

use devops_domain::error::DevOpsError;

pub struct MetricsService {
    registry: Registry,
    pub pipeline_triggers_total: CounterVec,
    pub webhook_deliveries_total: CounterVec,
    pub coordination_conflicts_total: CounterVec,
    pub workflow_stage_duration_seconds: HistogramVec,
    pub task_queue_depth: GaugeVec,
    pub task_outcomes_total: CounterVec,
    pub system_health_score: Gauge,
}

impl MetricsService {
    pub fn new() -> Result<Arc<Self>, DevOpsError> {
        let registry = Registry::new();

        let pipeline_triggers_total = CounterVec::new(
            prometheus::Opts::new(
                "devops_pipeline_triggers_total",
                "Total number of pipeline trigger attempts, by platform and outcome",
            ),
            &["platform", "outcome"],
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        let webhook_deliveries_total = CounterVec::new(
            prometheus::Opts::new(
                "devops_webhook_deliveries_total",
                "Total number of inbound webhook deliveries, by source and outcome",
            ),
            &["source", "outcome"],
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        let coordination_conflicts_total = CounterVec::new(
            prometheus::Opts::new(
                "devops_coordination_conflicts_total",
                "Total number of cross-platform coordination conflicts detected",
            ),
            &["repository"],
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        let workflow_stage_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "devops_workflow_stage_duration_seconds",
                "Workflow stage execution duration in seconds",
            ),
            &["stage", "status"],
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        let task_queue_depth = GaugeVec::new(
            prometheus::Opts::new(
                "devops_task_queue_depth",
                "Number of pending tasks in each background task fabric queue",
            ),
            &["queue"],
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        let task_outcomes_total = CounterVec::new(
            prometheus::Opts::new(
                "devops_task_outcomes_total",
                "Total number of background task fabric outcomes, by queue, task name, and outcome (success, failure, retry)",
            ),
            &["queue", "task", "outcome"],
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        let system_health_score = Gauge::new(
            "devops_system_health_score",
            "Weighted system health score in [0.0, 1.0]",
        )
        .map_err(|e| DevOpsError::internal(format!("failed to create metric: {e}")))?;

        registry
            .register(Box::new(pipeline_triggers_total.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;
        registry
            .register(Box::new(webhook_deliveries_total.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;
        registry
            .register(Box::new(coordination_conflicts_total.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;
        registry
            .register(Box::new(workflow_stage_duration_seconds.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;
        registry
            .register(Box::new(task_queue_depth.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;
        registry
            .register(Box::new(task_outcomes_total.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;
        registry
            .register(Box::new(system_health_score.clone()))
            .map_err(|e| DevOpsError::internal(format!("failed to register metric: {e}")))?;

        Ok(Arc::new(Self {
            registry,
            pipeline_triggers_total,
            webhook_deliveries_total,
            coordination_conflicts_total,
            workflow_stage_duration_seconds,
            task_queue_depth,
            task_outcomes_total,
            system_health_score,
        }))
    }

    /// Renders the registry in Prometheus text exposition format for the
    /// `/metrics` route.
    pub fn render(&self) -> Result<String, DevOpsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| DevOpsError::internal(format!("failed to encode metrics: {e}")))?;
        String::from_utf8(buffer)
            .map_err(|e| DevOpsError::internal(format!("metrics buffer was not valid utf-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        let service = MetricsService::new().unwrap();
        service
            .pipeline_triggers_total
            .with_label_values(&["github_actions", "success"])
            .inc();
        let rendered = service.render().unwrap();
        assert!(rendered.contains("devops_pipeline_triggers_total"));
    }
}
