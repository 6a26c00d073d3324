// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Webhook Delivery Repository Contract

use async_trait::async_trait;

use crate::entities::WebhookDelivery;
use crate::error::DevOpsError;
use crate::value_objects::WebhookSource;

#[async_trait]
pub trait WebhookDeliveryRepository: Send + Sync {
    async fn save(&self, delivery: &WebhookDelivery) -> Result<(), DevOpsError>;

    /// Most recent deliveries across every source, newest first, for the
    /// dashboard's webhook feed.
    async fn list_recent(&self, limit: usize) -> Result<Vec<WebhookDelivery>, DevOpsError>;

    async fn list_recent_by_source(&self, source: WebhookSource, limit: usize) -> Result<Vec<WebhookDelivery>, DevOpsError>;
}
