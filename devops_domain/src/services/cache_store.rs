// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key-Value / Cache Store Contract
//!
//! The port the Redis-backed cache adapter implements: TTL-based key/value
//! storage, append-only streams bounded by `maxlen` (used for the event and
//! webhook feeds), and hash storage (used to mirror the pipeline registry
//! for fast lookups).

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::DevOpsError;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), DevOpsError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, DevOpsError>;

    async fn delete(&self, key: &str) -> Result<bool, DevOpsError>;

    /// Appends an entry to a capped stream, evicting the oldest entries once
    /// `maxlen` is exceeded.
    async fn stream_add(&self, stream_key: &str, value: Value, maxlen: usize) -> Result<(), DevOpsError>;

    async fn hash_set(&self, hash_key: &str, field: &str, value: Value) -> Result<(), DevOpsError>;

    async fn hash_get_all(&self, hash_key: &str) -> Result<Vec<(String, Value)>, DevOpsError>;

    async fn set_add(&self, set_key: &str, member: &str) -> Result<(), DevOpsError>;

    /// True when the underlying store can be reached; the dashboard surface
    /// reports this as part of its health panel.
    async fn ping(&self) -> bool;
}
