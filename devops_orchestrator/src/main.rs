// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DevOps Orchestrator Entry Point
//!
//! Composition root: parses CLI args via [`devops_bootstrap`], loads
//! configuration, wires repositories/cache/connectors/task fabric, and
//! either serves the unified HTTP surface or runs a one-shot subcommand.

use std::collections::HashMap;
use std::sync::Arc;

use devops_bootstrap::cli::{ValidatedCli, ValidatedCommand};
use devops_bootstrap::{exit_code, logger, signals::create_signal_handler, ShutdownCoordinator};
use devops_domain::entities::WebhookEndpointConfig;
use devops_domain::error::DevOpsError;
use devops_domain::repositories::PipelineRegistryRepository;
use devops_domain::value_objects::{CoordinationRule, PlatformType, RepositoryRef, WebhookSource, WorkflowRef};

use devops_orchestrator::application::services::{MultiChannelNotificationDispatcher, TaskFabric, TaskQueueName, UniversalPipelineManager, WorkflowOrchestrator};
use devops_orchestrator::application::services::notifications::ChannelEndpoint;
use devops_orchestrator::infrastructure::cache::RedisCacheStore;
use devops_orchestrator::infrastructure::config::AppConfig;
use devops_orchestrator::infrastructure::connectors::{GitHubActionsConnector, GitLabCiConnector};
use devops_orchestrator::infrastructure::ingestion::{RepositoryPoller, TrackedClone};
use devops_orchestrator::infrastructure::metrics::MetricsService;
use devops_orchestrator::infrastructure::repositories::{
    PostgresAuditLogRepository, PostgresEventRepository, PostgresPipelineRegistryRepository, PostgresWebhookDeliveryRepository,
    PostgresWorkflowExecutionRepository,
};
use devops_orchestrator::infrastructure::store::{self, MigrationManager, RetentionRunner};
use devops_orchestrator::presentation::{self, AppState};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match devops_bootstrap::bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("CLI error: {e}");
            return std::process::ExitCode::from(64);
        }
    };

    let json_logs = !cfg!(debug_assertions);
    logger::init_tracing(json_logs, validated.verbose);

    exit_code::result_to_exit_code(run(validated).await)
}

async fn run(validated: ValidatedCli) -> Result<(), DevOpsError> {
    let config_path = validated.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let config = Arc::new(AppConfig::load(config_path.as_deref())?);

    match validated.command {
        ValidatedCommand::Validate { config: path } => {
            AppConfig::load(Some(&path.to_string_lossy()))?;
            tracing::info!(path = %path.display(), "configuration is valid");
            Ok(())
        }
        ValidatedCommand::Migrate { dry_run } => run_migrate(&config, dry_run).await,
        ValidatedCommand::DiscoverWorkflows { repository, platform } => run_discover(&config, &repository, &platform).await,
        ValidatedCommand::TriggerWorkflow { pipeline, git_ref } => run_trigger(&config, &pipeline, &git_ref).await,
        ValidatedCommand::Serve { bind } => run_serve(config, bind).await,
    }
}

async fn run_migrate(config: &AppConfig, dry_run: bool) -> Result<(), DevOpsError> {
    let pool = store::connect(&config.store.database_url, config.store.max_connections).await?;
    let manager = MigrationManager::new(&pool);
    if dry_run {
        tracing::info!("dry run: not applying migrations");
        return Ok(());
    }
    let applied = manager.migrate().await?;
    tracing::info!(count = applied.len(), "migrations applied");
    Ok(())
}

fn build_connectors(config: &AppConfig) -> HashMap<PlatformType, Arc<dyn devops_domain::services::CiCdConnector>> {
    let mut connectors: HashMap<PlatformType, Arc<dyn devops_domain::services::CiCdConnector>> = HashMap::new();
    if let Some(token) = &config.connectors.github_token {
        connectors.insert(PlatformType::GithubActions, Arc::new(GitHubActionsConnector::new(token.clone())));
    }
    if let Some(token) = &config.connectors.gitlab_token {
        connectors.insert(PlatformType::GitlabCi, Arc::new(GitLabCiConnector::new(token.clone())));
    }
    connectors
}

async fn run_discover(config: &AppConfig, repository: &str, platform: &str) -> Result<(), DevOpsError> {
    let pool = store::connect(&config.store.database_url, config.store.max_connections).await?;
    let registry = Arc::new(PostgresPipelineRegistryRepository::new(pool));
    let connectors = build_connectors(config);
    let manager = UniversalPipelineManager::new(registry, connectors, Vec::<CoordinationRule>::new());

    let platform: PlatformType = platform.parse()?;
    if manager.connector_for(platform).is_none() {
        return Err(DevOpsError::validation(format!("no connector configured for platform '{platform}'")));
    }
    let repo = RepositoryRef::new(repository)?;
    let discovered = manager.discover_all_workflows(&repo).await?;
    tracing::info!(repository, discovered, "workflow discovery complete");
    Ok(())
}

/// Triggers one previously-discovered pipeline's upstream workflow directly
/// through its CI/CD connector, bypassing the local stage orchestrator
/// (which drives definitions composed from discovered stages, not a single
/// ad-hoc manual run).
async fn run_trigger(config: &AppConfig, pipeline: &str, git_ref: &str) -> Result<(), DevOpsError> {
    let pool = store::connect(&config.store.database_url, config.store.max_connections).await?;
    let registry = Arc::new(PostgresPipelineRegistryRepository::new(pool));
    let connectors = build_connectors(config);

    let pipeline_id = devops_domain::value_objects::PipelineId::from_stored(pipeline);
    let entry = registry
        .get(&pipeline_id)
        .await?
        .ok_or_else(|| DevOpsError::not_found(format!("no registered pipeline '{pipeline}'")))?;
    let connector = connectors
        .get(&entry.platform)
        .ok_or_else(|| DevOpsError::validation(format!("no connector configured for platform '{}'", entry.platform)))?;

    let repo = RepositoryRef::new(&entry.repository)?;
    let workflow_ref = WorkflowRef::Named(entry.workflow_name.clone());
    let result = connector
        .trigger_workflow(&repo, &workflow_ref, git_ref, serde_json::json!({}))
        .await?;
    match result.run_id {
        Some(run_id) => tracing::info!(pipeline, git_ref, %run_id, "workflow triggered"),
        None => tracing::warn!(pipeline, git_ref, error = ?result.error, "workflow trigger did not return a run id"),
    }
    Ok(())
}

async fn run_serve(config: Arc<AppConfig>, bind_override: Option<String>) -> Result<(), DevOpsError> {
    let pool = store::connect(&config.store.database_url, config.store.max_connections).await?;
    MigrationManager::new(&pool).migrate().await?;

    let events = Arc::new(PostgresEventRepository::new(pool.clone()));
    let audit_log = Arc::new(PostgresAuditLogRepository::new(pool.clone()));
    let webhook_deliveries = Arc::new(PostgresWebhookDeliveryRepository::new(pool.clone()));
    let registry = Arc::new(PostgresPipelineRegistryRepository::new(pool.clone()));
    let executions = Arc::new(PostgresWorkflowExecutionRepository::new(pool.clone()));
    let retention_pool = pool.clone();

    let cache = Arc::new(RedisCacheStore::connect(&config.cache.redis_url).await?);

    let metrics = MetricsService::new()?;
    let fabric = TaskFabric::spawn(Some(metrics.clone()));

    let connectors = build_connectors(&config);
    let pipeline_manager = Arc::new(UniversalPipelineManager::new(registry, connectors, Vec::<CoordinationRule>::new()));
    let workflow_orchestrator = Arc::new(WorkflowOrchestrator::new(executions, fabric.clone()));

    let webhook_endpoints = build_webhook_endpoints(&config);

    let state = AppState::new(
        config.clone(),
        events,
        audit_log,
        webhook_deliveries,
        cache,
        pipeline_manager,
        workflow_orchestrator,
        fabric,
        metrics,
        webhook_endpoints,
    );

    let bind_addr = bind_override.unwrap_or_else(|| config.ingestion.webhook_bind_addr.clone());
    let shutdown = ShutdownCoordinator::default();

    spawn_poller(&config, state.clone(), shutdown.token());
    spawn_retention_sweeper(&config, state.task_fabric.clone(), retention_pool, shutdown.token());

    let router = presentation::build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to bind {bind_addr}: {e}")))?;
    tracing::info!(%bind_addr, "devops orchestrator listening");

    let signal_handler = create_signal_handler();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || shutdown_for_signal.initiate_shutdown()))
            .await;
    });

    let shutdown_token = shutdown.token();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
        .map_err(|e| DevOpsError::internal(format!("server error: {e}")))?;

    shutdown.complete_shutdown();
    Ok(())
}

/// Builds the dispatcher used by workflow-completion task-fabric handlers
/// (wired at the point those handlers are registered, not in the HTTP
/// composition root) from the configured channel webhook URLs.
#[allow(dead_code)]
fn build_notification_dispatcher(config: &AppConfig) -> MultiChannelNotificationDispatcher {
    let mut endpoints = Vec::new();
    if let Some(url) = &config.notifications.slack_webhook_url {
        endpoints.push(ChannelEndpoint { channel: devops_domain::entities::NotificationChannel::Slack, webhook_url: url.clone() });
    }
    if let Some(url) = &config.notifications.teams_webhook_url {
        endpoints.push(ChannelEndpoint { channel: devops_domain::entities::NotificationChannel::Teams, webhook_url: url.clone() });
    }
    if let Some(url) = &config.notifications.discord_webhook_url {
        endpoints.push(ChannelEndpoint { channel: devops_domain::entities::NotificationChannel::Discord, webhook_url: url.clone() });
    }
    MultiChannelNotificationDispatcher::new(endpoints)
}

fn build_webhook_endpoints(config: &AppConfig) -> HashMap<WebhookSource, WebhookEndpointConfig> {
    let mut endpoints = HashMap::new();
    endpoints.insert(WebhookSource::GitHub, WebhookEndpointConfig::new(WebhookSource::GitHub, config.webhooks.github_secret.clone()));
    endpoints.insert(WebhookSource::GitLab, WebhookEndpointConfig::new(WebhookSource::GitLab, config.webhooks.gitlab_secret.clone()));
    endpoints.insert(WebhookSource::Jenkins, WebhookEndpointConfig::new(WebhookSource::Jenkins, config.webhooks.jenkins_secret.clone()));
    endpoints.insert(WebhookSource::Generic, WebhookEndpointConfig::new(WebhookSource::Generic, None));
    endpoints
}

/// Submits [`RetentionRunner`] to the `analytics` queue on
/// `retention.sweep_interval_secs`; exits when `token` is cancelled.
fn spawn_retention_sweeper(config: &AppConfig, fabric: TaskFabric, pool: sqlx::PgPool, token: devops_bootstrap::shutdown::CancellationToken) {
    let interval_secs = config.retention.sweep_interval_secs;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    let pool_for_task = pool.clone();
                    let result = fabric
                        .enqueue(TaskQueueName::Analytics, "retention_cleanup", move || {
                            let pool = pool_for_task.clone();
                            async move {
                                let runner = RetentionRunner::new(&pool);
                                let applied = runner.run(false).await?;
                                tracing::info!(tables = applied.len(), "retention sweep complete");
                                Ok(())
                            }
                        })
                        .await;
                    if let Err(err) = result {
                        tracing::warn!(error = %err, "failed to enqueue retention sweep");
                    }
                }
            }
        }
    });
}

/// Spawns the local-clone poll loop when any are configured; exits when
/// `token` is cancelled.
fn spawn_poller(config: &AppConfig, state: AppState, token: devops_bootstrap::shutdown::CancellationToken) {
    if config.ingestion.local_clones.is_empty() {
        return;
    }
    let tracked: Vec<_> = config
        .ingestion
        .local_clones
        .iter()
        .filter_map(|lc| {
            RepositoryRef::new(&lc.repository).ok().map(|repository| TrackedClone {
                repository,
                path: std::path::PathBuf::from(&lc.path),
                tracked_branches: lc.tracked_branches.clone(),
            })
        })
        .collect();
    let interval_secs = config.ingestion.poll_interval_secs;
    let state_dir = config.ingestion.poller_state_dir.as_ref().map(std::path::PathBuf::from);

    tokio::spawn(async move {
        let mut poller = RepositoryPoller::new(tracked, state_dir);
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    for (repo, outcome) in poller.poll_once() {
                        match outcome {
                            Ok(events) => {
                                for event in events {
                                    if let Err(err) = presentation::webhook::record_event(&state, &event).await {
                                        tracing::warn!(%repo, error = %err, "failed to record polled event");
                                    }
                                }
                            }
                            Err(err) => tracing::warn!(%repo, error = %err, "repository poll failed"),
                        }
                    }
                }
            }
        }
    });
}
