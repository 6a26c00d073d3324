// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Webhook Delivery Entities
//!
//! `WebhookEndpointConfig` describes a registered receiver (source, secret,
//! which event types it accepts); `WebhookDelivery` is a single inbound
//! delivery after signature verification and JSON parsing, before it has
//! been normalized into a [`crate::entities::repository_event::RepositoryEvent`].
//! Ported from `WebhookConfig` / `WebhookEvent` in the webhook receiver this
//! module generalizes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::{WebhookId, WebhookSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEndpointConfig {
    pub source: WebhookSource,
    pub secret: Option<String>,
    pub verify_signature: bool,
    pub enabled: bool,
    pub supported_events: Vec<String>,
}

impl WebhookEndpointConfig {
    /// Builds a config with the source's default supported-event set, the
    /// way `WebhookConfig.__post_init__` populates it when the caller
    /// doesn't specify one.
    pub fn new(source: WebhookSource, secret: Option<String>) -> Self {
        Self {
            source,
            verify_signature: secret.is_some(),
            secret,
            enabled: true,
            supported_events: source
                .default_supported_events()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn accepts(&self, event_type: &str) -> bool {
        self.supported_events.iter().any(|e| e == event_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub id: WebhookId,
    pub source: WebhookSource,
    pub event_type: String,
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

impl WebhookDelivery {
    pub fn new(source: WebhookSource, event_type: impl Into<String>, payload: Value, received_at: DateTime<Utc>) -> Self {
        let event_type = event_type.into();
        let id = WebhookId::derive(source.as_str(), &event_type, received_at.timestamp_millis());
        Self {
            id,
            source,
            event_type,
            payload,
            received_at,
        }
    }
}
