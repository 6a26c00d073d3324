// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Adapters implementing the domain's ports: a Postgres-backed relational
//! store, a Redis-backed cache, CI/CD connector adapters, git/webhook
//! ingestion, Prometheus metrics, and structured logging/observability.

pub mod cache;
pub mod config;
pub mod connectors;
pub mod ingestion;
pub mod logging;
pub mod metrics;
pub mod repositories;
pub mod store;
