// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Ingestion
//!
//! Two independent paths converge on [`devops_domain::entities::RepositoryEvent`]:
//! a `git2`-backed poller that diffs tracked repositories on an interval,
//! and a webhook receiver that parses inbound HTTP deliveries. Both paths
//! rely on [`RepositoryEvent::new`]'s deterministic id derivation to make
//! persistence naturally idempotent when they observe the same change.

pub mod poller;
pub mod webhook;

pub use poller::{RepositoryPoller, TrackedClone};
pub use webhook::parse_webhook_payload;
