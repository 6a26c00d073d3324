// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation Layer
//!
//! A single `axum` router serves three concerns that the original deployed
//! as two separate HTTP stacks (a webhook receiver and a hand-rolled
//! metrics/health server): inbound webhook ingestion, the live dashboard
//! API and websocket feed, and Prometheus metrics exposition. Running one
//! HTTP server instead of two means one bind address, one TLS termination
//! point, and one place to apply `tower-http` tracing/CORS middleware.
//!
//! ## Routes
//!
//! - `POST /webhook/{source}` / `POST /webhook` — inbound CI/CD and git
//!   host webhook deliveries
//! - `GET /health` — liveness probe for the webhook surface ("OK")
//! - `GET /status` — configured webhook endpoints and handler counts
//! - `GET /api/dashboard` — a point-in-time snapshot for the dashboard UI
//! - `GET /api/metrics` — the same snapshot's system metrics alone
//! - `GET /api/health` — overall platform health (200 healthy/degraded,
//!   503 unhealthy)
//! - `GET /ws` — a websocket pushing `dashboard_update` frames on an
//!   interval
//! - `GET /metrics` — Prometheus text exposition
//! - `GET /api/analytics/{pipeline_id}` — performance, bottleneck, trend,
//!   reliability, and failure-prediction analytics for one registered
//!   pipeline

pub mod analytics;
pub mod dashboard;
pub mod error;
pub mod router;
pub mod state;
pub mod webhook;

pub use router::build_router;
pub use state::AppState;
