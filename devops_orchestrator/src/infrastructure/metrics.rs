// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics
//!
//! Process-wide Prometheus metrics, exposed in text format on the unified
//! HTTP surface's `/metrics` route (see [`crate::presentation`]) rather than
//! via a dedicated raw-TCP listener.

pub mod service;

pub use service::MetricsService;
