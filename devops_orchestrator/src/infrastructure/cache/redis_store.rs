// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Redis Cache Store
//!
//! Implements [`CacheStore`] over a `redis::aio::ConnectionManager`, which
//! transparently reconnects on connection loss — the background task
//! fabric and event ingestion paths treat a momentarily unreachable cache
//! as transient rather than fatal.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;

use devops_domain::error::DevOpsError;
use devops_domain::services::CacheStore;

pub struct RedisCacheStore {
    manager: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(redis_url: &str) -> Result<Self, DevOpsError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| DevOpsError::validation(format!("invalid redis url: {e}")))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| DevOpsError::unavailable(format!("failed to connect to redis: {e}")))?;
        Ok(Self { manager })
    }

    fn map_redis_err(err: redis::RedisError) -> DevOpsError {
        if err.is_connection_dropped() || err.is_timeout() {
            DevOpsError::unavailable(format!("redis connection error: {err}"))
        } else {
            DevOpsError::internal(format!("redis error: {err}"))
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), DevOpsError> {
        let mut conn = self.manager.clone();
        let payload = serde_json::to_string(&value)?;
        match ttl {
            Some(duration) => {
                let _: () = conn
                    .set_ex(key, payload, duration.as_secs().max(1))
                    .await
                    .map_err(Self::map_redis_err)?;
            }
            None => {
                let _: () = conn.set(key, payload).await.map_err(Self::map_redis_err)?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, DevOpsError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(key).await.map_err(Self::map_redis_err)?;
        raw.map(|s| serde_json::from_str(&s).map_err(DevOpsError::from)).transpose()
    }

    async fn delete(&self, key: &str) -> Result<bool, DevOpsError> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.del(key).await.map_err(Self::map_redis_err)?;
        Ok(removed > 0)
    }

    async fn stream_add(&self, stream_key: &str, value: Value, maxlen: usize) -> Result<(), DevOpsError> {
        let mut conn = self.manager.clone();
        let payload = serde_json::to_string(&value)?;
        let _: String = redis::cmd("XADD")
            .arg(stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(maxlen)
            .arg("*")
            .arg("data")
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_redis_err)?;
        Ok(())
    }

    async fn hash_set(&self, hash_key: &str, field: &str, value: Value) -> Result<(), DevOpsError> {
        let mut conn = self.manager.clone();
        let payload = serde_json::to_string(&value)?;
        let _: () = conn.hset(hash_key, field, payload).await.map_err(Self::map_redis_err)?;
        Ok(())
    }

    async fn hash_get_all(&self, hash_key: &str) -> Result<Vec<(String, Value)>, DevOpsError> {
        let mut conn = self.manager.clone();
        let raw: std::collections::HashMap<String, String> =
            conn.hgetall(hash_key).await.map_err(Self::map_redis_err)?;
        raw.into_iter()
            .map(|(field, payload)| {
                serde_json::from_str(&payload)
                    .map(|v| (field, v))
                    .map_err(DevOpsError::from)
            })
            .collect()
    }

    async fn set_add(&self, set_key: &str, member: &str) -> Result<(), DevOpsError> {
        let mut conn = self.manager.clone();
        let _: () = conn.sadd(set_key, member).await.map_err(Self::map_redis_err)?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await.is_ok()
    }
}
