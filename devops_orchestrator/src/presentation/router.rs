// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # HTTP Router

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{analytics, dashboard, state::AppState, webhook};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/{source}", post(webhook::post_webhook_source))
        .route("/webhook", post(webhook::post_webhook_generic))
        .route("/health", get(webhook::get_health))
        .route("/status", get(webhook::get_status))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/metrics", get(dashboard::get_metrics_summary))
        .route("/api/health", get(dashboard::get_health))
        .route("/api/analytics/{pipeline_id}", get(analytics::get_pipeline_analytics))
        .route("/ws", get(dashboard::websocket_upgrade))
        .route("/metrics", get(dashboard::metrics_prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
