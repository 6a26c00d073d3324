// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging and Observability
//!
//! Structured logging is initialized once at process start by
//! `devops_bootstrap::logger` using `tracing-subscriber`, emitting JSON in
//! production and pretty-printed spans in development. This module owns the
//! runtime health-scoring and alert-derivation logic the dashboard surface
//! (§4.K) reads from.

pub mod observability;
pub mod sampler;

pub use observability::{Alert, AlertSeverity, ObservabilityService, SystemHealth, SystemSnapshot};
pub use sampler::SystemSampler;
