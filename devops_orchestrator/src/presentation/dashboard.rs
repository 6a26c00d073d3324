// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dashboard & Health Routes
//!
//! `GET /api/dashboard` assembles one point-in-time snapshot from the
//! repositories and pipeline registry; `GET /ws` upgrades to a websocket and
//! periodically pushes the same snapshot shape as a `dashboard_update`
//! frame, plus the out-of-band repository-event pushes the webhook routes
//! send as they land.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::infrastructure::logging::{ObservabilityService, SystemSnapshot};
use crate::presentation::state::AppState;

async fn aggregate_success_rate(state: &AppState) -> f64 {
    let Ok(entries) = state.pipeline_manager.registry().list_all().await else {
        return 0.0;
    };
    if entries.is_empty() {
        return 1.0;
    }
    entries.iter().map(|e| e.success_rate).sum::<f64>() / entries.len() as f64
}

async fn build_snapshot(state: &AppState) -> serde_json::Value {
    let cache_connected = state.cache.ping().await;
    let success_rate = aggregate_success_rate(state).await;

    let mut hardware = state.sampler.sample();
    hardware.cache_connected = cache_connected;
    hardware.aggregate_success_rate = success_rate;
    hardware.monitoring_active = !state.config.ingestion.tracked_repositories.is_empty();

    let health = ObservabilityService::health_score(&hardware);
    state.metrics.system_health_score.set(health.score);

    let mut git_events = Vec::new();
    for repo in &state.config.ingestion.tracked_repositories {
        if let Ok(repository) = devops_domain::value_objects::RepositoryRef::new(repo) {
            if let Ok(events) = state.events.list_recent(&repository, 20).await {
                git_events.extend(events);
            }
        }
    }

    let webhook_events = state.webhook_deliveries.list_recent(20).await.unwrap_or_default();
    let workflow_executions = state.workflow_orchestrator.executions().list_recent_all(20).await.unwrap_or_default();

    let pipelines = state.pipeline_manager.registry().list_all().await.unwrap_or_default();
    let repository_status: Vec<serde_json::Value> = pipelines
        .iter()
        .map(|entry| {
            json!({
                "pipeline_id": entry.pipeline_id.as_str(),
                "platform": entry.platform.as_str(),
                "repository": entry.repository,
                "workflow_name": entry.workflow_name,
                "success_rate": entry.success_rate,
                "avg_duration_secs": entry.avg_duration_secs,
                "total_runs": entry.total_runs,
                "last_run_at": entry.last_run_at,
            })
        })
        .collect();
    let monitored_repositories: std::collections::HashSet<&str> = pipelines.iter().map(|e| e.repository.as_str()).collect();

    json!({
        "git_events": git_events,
        "webhook_events": webhook_events,
        "workflow_executions": workflow_executions,
        "system_metrics": {
            "git_events": { "tracked_repositories": state.config.ingestion.tracked_repositories.len(), "recent_count": git_events.len() },
            "webhooks": { "configured_endpoints": state.webhook_endpoints.len(), "recent_count": webhook_events.len() },
            "workflows": { "recent_count": workflow_executions.len(), "aggregate_success_rate": hardware.aggregate_success_rate },
            "system": {
                "cpu_percent": hardware.cpu_percent,
                "memory_percent": hardware.memory_percent,
                "disk_percent": hardware.disk_percent,
                "cache_connected": hardware.cache_connected,
                "monitoring_active": hardware.monitoring_active,
                "health_score": health.score,
            },
        },
        "repository_status": {
            "monitored_count": monitored_repositories.len(),
            "repositories": repository_status,
        },
        "alerts": health.alerts,
        "timestamp": chrono::Utc::now(),
    })
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(build_snapshot(&state).await)
}

pub async fn get_metrics_summary(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = build_snapshot(&state).await;
    Json(snapshot["system_metrics"].clone())
}

pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    let cache_connected = state.cache.ping().await;
    let success_rate = aggregate_success_rate(&state).await;
    let mut hardware = state.sampler.sample();
    hardware.cache_connected = cache_connected;
    hardware.aggregate_success_rate = success_rate;
    hardware.monitoring_active = !state.config.ingestion.tracked_repositories.is_empty();

    let health = ObservabilityService::health_score(&hardware);
    let status = if health.score >= 0.8 {
        "healthy"
    } else if health.score >= 0.5 {
        "degraded"
    } else {
        "unhealthy"
    };
    let code = if status == "unhealthy" { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::OK };

    (code, Json(json!({ "status": status, "score": health.score, "alerts": health.alerts })))
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub async fn websocket_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket_loop(socket, state))
}

/// Pushes `dashboard_update` frames on `dashboard.snapshot_interval_secs`,
/// interleaved with the webhook routes' out-of-band `repository_event`
/// pushes received on the same broadcast channel.
async fn websocket_loop(mut socket: WebSocket, state: AppState) {
    let mut rx = state.dashboard_tx.subscribe();
    let mut interval = tokio::time::interval(Duration::from_secs(state.config.dashboard.snapshot_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = build_snapshot(&state).await;
                let frame = json!({ "type": "dashboard_update", "data": snapshot });
                if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
            event = rx.recv() => {
                match event {
                    Ok(frame) => {
                        if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
