// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DevOps Domain
//!
//! Pure, reusable business logic for the devops orchestration platform:
//! entities, value objects, domain events, and the repository/service
//! traits (ports) that the `devops_orchestrator` crate's infrastructure
//! layer implements. Following Domain-Driven Design, nothing in this crate
//! touches a network socket, a database connection, or the `tokio` runtime
//! directly — repository and connector traits are `async` because the
//! operations they describe are inherently I/O-bound, but their
//! implementations live entirely in infrastructure.
//!
//! ## Layout
//!
//! - [`error`] — the [`error::DevOpsError`] taxonomy shared by every layer
//!   above this one.
//! - [`value_objects`] — immutable, self-validating types with no identity:
//!   identifiers, enums, and small structs like [`value_objects::CoordinationRule`].
//! - [`entities`] — objects with identity and a lifecycle: repository
//!   events, webhook deliveries, workflow definitions/executions, the
//!   pipeline registry, notifications, audit log entries.
//! - [`events`] — the generic [`events::DomainEvent`] envelope used to
//!   publish entity state changes for tracing and the dashboard feed.
//! - [`repositories`] — persistence contracts (ports) for the aggregates
//!   above.
//! - [`services`] — infrastructure ports (cache store, CI/CD connector,
//!   notification dispatcher) plus dependency-free domain logic (webhook
//!   signature verification).

pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::DevOpsError;
