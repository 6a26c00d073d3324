// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Postgres Webhook Delivery Repository

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};

use devops_domain::entities::WebhookDelivery;
use devops_domain::error::DevOpsError;
use devops_domain::repositories::WebhookDeliveryRepository;
use devops_domain::value_objects::{WebhookId, WebhookSource};

pub struct PostgresWebhookDeliveryRepository {
    pool: PgPool,
}

impl PostgresWebhookDeliveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_delivery(row: &sqlx::postgres::PgRow) -> Result<WebhookDelivery, DevOpsError> {
    let id: String = row.try_get("id").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let source: String = row.try_get("source").map_err(|e| DevOpsError::internal(e.to_string()))?;
    let payload: serde_json::Value = row.try_get("payload").map_err(|e| DevOpsError::internal(e.to_string()))?;

    Ok(WebhookDelivery {
        id: WebhookId::from_stored(id),
        source: WebhookSource::parse(&source).unwrap_or(WebhookSource::Generic),
        event_type: row.try_get("event_type").map_err(|e| DevOpsError::internal(e.to_string()))?,
        payload,
        received_at: row.try_get("received_at").map_err(|e| DevOpsError::internal(e.to_string()))?,
    })
}

#[async_trait]
impl WebhookDeliveryRepository for PostgresWebhookDeliveryRepository {
    async fn save(&self, delivery: &WebhookDelivery) -> Result<(), DevOpsError> {
        sqlx::query(
            "INSERT INTO webhook_deliveries (id, source, event_type, payload, received_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(delivery.id.as_str())
        .bind(delivery.source.as_str())
        .bind(&delivery.event_type)
        .bind(&delivery.payload)
        .bind(delivery.received_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DevOpsError::internal(format!("failed to save webhook delivery: {e}")))?;
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<WebhookDelivery>, DevOpsError> {
        let rows = sqlx::query("SELECT * FROM webhook_deliveries ORDER BY received_at DESC LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to list webhook deliveries: {e}")))?;
        rows.iter().map(row_to_delivery).collect()
    }

    async fn list_recent_by_source(&self, source: WebhookSource, limit: usize) -> Result<Vec<WebhookDelivery>, DevOpsError> {
        let rows = sqlx::query("SELECT * FROM webhook_deliveries WHERE source = $1 ORDER BY received_at DESC LIMIT $2")
            .bind(source.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DevOpsError::internal(format!("failed to list webhook deliveries: {e}")))?;
        rows.iter().map(row_to_delivery).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stored_source_falls_back_to_generic() {
        assert!(WebhookSource::parse("not-a-real-source").is_none());
    }
}
