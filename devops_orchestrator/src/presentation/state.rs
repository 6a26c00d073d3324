// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shared Application State
//!
//! One [`AppState`] is cloned into every `axum` handler (cheap: every field
//! is an `Arc` or a broadcast sender). It is the seam between the HTTP
//! surface and the application/infrastructure layers below it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use devops_domain::entities::WebhookEndpointConfig;
use devops_domain::repositories::{AuditLogRepository, EventRepository, WebhookDeliveryRepository, WorkflowExecutionRepository};
use devops_domain::services::CacheStore;
use devops_domain::value_objects::WebhookSource;

use crate::application::services::{AnalyticsEngine, TaskFabric, UniversalPipelineManager, WorkflowOrchestrator};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::logging::SystemSampler;
use crate::infrastructure::metrics::MetricsService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub events: Arc<dyn EventRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
    pub webhook_deliveries: Arc<dyn WebhookDeliveryRepository>,
    pub cache: Arc<dyn CacheStore>,
    pub pipeline_manager: Arc<UniversalPipelineManager>,
    pub workflow_orchestrator: Arc<WorkflowOrchestrator>,
    pub task_fabric: TaskFabric,
    pub metrics: Arc<MetricsService>,
    pub analytics: Arc<AnalyticsEngine>,
    pub sampler: Arc<SystemSampler>,
    pub webhook_endpoints: Arc<HashMap<WebhookSource, WebhookEndpointConfig>>,
    pub dashboard_tx: broadcast::Sender<serde_json::Value>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<AppConfig>,
        events: Arc<dyn EventRepository>,
        audit_log: Arc<dyn AuditLogRepository>,
        webhook_deliveries: Arc<dyn WebhookDeliveryRepository>,
        cache: Arc<dyn CacheStore>,
        pipeline_manager: Arc<UniversalPipelineManager>,
        workflow_orchestrator: Arc<WorkflowOrchestrator>,
        task_fabric: TaskFabric,
        metrics: Arc<MetricsService>,
        webhook_endpoints: HashMap<WebhookSource, WebhookEndpointConfig>,
    ) -> Self {
        let (dashboard_tx, _) = broadcast::channel(256);
        Self {
            config,
            events,
            audit_log,
            webhook_deliveries,
            cache,
            pipeline_manager,
            workflow_orchestrator,
            task_fabric,
            metrics,
            analytics: Arc::new(AnalyticsEngine::new()),
            sampler: Arc::new(SystemSampler::new()),
            webhook_endpoints: Arc::new(webhook_endpoints),
            dashboard_tx,
            started_at: chrono::Utc::now(),
        }
    }
}
