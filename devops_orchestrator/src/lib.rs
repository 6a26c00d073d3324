// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # DevOps Orchestrator
//!
//! A unified ingestion, orchestration, and observability platform for
//! multi-platform CI/CD: GitHub Actions, GitLab CI, and Jenkins workflows
//! are discovered, triggered, and monitored through one universal pipeline
//! contract, with cross-platform resource coordination, a background task
//! fabric, analytics/prediction, and a live dashboard.
//!
//! ## Architecture Overview
//!
//! This crate follows Clean Architecture and Domain-Driven Design, mirroring
//! the layering of [`devops_domain`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Presentation Layer                         │
//! │  (Webhook ingestion, dashboard API + websocket, metrics)    │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  (Pipeline manager, workflow orchestrator, task fabric,     │
//! │   analytics engine, notification dispatcher)                │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                              │
//! │  (devops_domain: entities, value objects, ports, events)     │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                          │
//! │  (Postgres store, Redis cache, CI/CD connectors, git/webhook │
//! │   ingestion, Prometheus metrics)                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Concepts
//!
//! ### Repository Event
//! A normalized git activity record — push, branch or tag create/delete, or
//! pull/merge request — produced either by polling a local clone or by
//! parsing an inbound webhook payload. Every event carries a deterministic,
//! content-derived [`devops_domain::value_objects::EventId`] so redelivered
//! webhooks and redundant polls are naturally deduplicated.
//!
//! ### Universal Pipeline
//! A CI/CD workflow on a specific platform, addressed by a composite
//! [`devops_domain::value_objects::PipelineId`]. The
//! [`application::UniversalPipelineManager`] discovers, triggers, and
//! tracks these workflows through the same [`devops_domain::services::CiCdConnector`]
//! contract regardless of which platform backs them.
//!
//! ### Workflow Execution
//! An internally orchestrated DAG of stages, run by the
//! [`application::WorkflowOrchestrator`] against the stage dependency graph
//! declared in a [`devops_domain::entities::WorkflowDefinition`].
//!
//! ## Error Handling
//!
//! A single [`devops_domain::error::DevOpsError`] taxonomy flows end to end:
//! transient upstream failures are retried by the background task fabric,
//! permanent ones surface immediately, and every variant maps to an HTTP
//! status for the webhook and dashboard APIs.
//!
//! ## Testing
//!
//! - Unit tests alongside each module (`#[cfg(test)] mod tests`)
//! - Integration tests in `tests/` exercising the Postgres store and Redis
//!   cache against real services
//! - End-to-end tests driving the webhook and dashboard HTTP surface
//!
//! ## License
//!
//! This project is licensed under the BSD 3-Clause License - see LICENSE file
//! for details.

pub mod application;
pub mod infrastructure;
pub mod presentation;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use devops_domain::error::DevOpsError;
