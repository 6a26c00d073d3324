// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Relational Store
//!
//! A Postgres connection pool plus a hand-rolled, checksum-validated
//! migration runner. Migrations are plain Rust values rather than `.sql`
//! files loaded by `sqlx::migrate!`, mirroring `migration_manager.py`'s
//! approach of keeping migration SQL and its integrity checksum together in
//! code that can be audited without touching the filesystem at deploy time.

pub mod migration;
pub mod pool;
pub mod retention;

pub use migration::{Migration, MigrationManager};
pub use pool::connect;
pub use retention::RetentionRunner;
