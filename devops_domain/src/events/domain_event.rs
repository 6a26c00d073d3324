// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic Domain Event Envelope
//!
//! `DomainEvent<T>` wraps a payload with the metadata every event needs
//! regardless of what it carries: a unique id, an RFC3339 timestamp, a
//! schema version, and optional correlation/causation ids for tracing one
//! event to the one that triggered it (e.g. a `RepositoryEvent` causing a
//! `WorkflowTriggered` event).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<T> {
    pub event_id: Uuid,
    pub payload: T,
    pub occurred_at: DateTime<Utc>,
    pub version: u64,
    pub correlation_id: Option<Uuid>,
    pub causation_id: Option<Uuid>,
    pub metadata: HashMap<String, String>,
}

impl<T> DomainEvent<T> {
    pub fn new(payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            payload,
            occurred_at: Utc::now(),
            version: 1,
            correlation_id: None,
            causation_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn caused_by(payload: T, causation_id: Uuid, correlation_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            payload,
            occurred_at: Utc::now(),
            version: 1,
            correlation_id: Some(correlation_id),
            causation_id: Some(causation_id),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn event_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    pub fn is_correlated_with(&self, other: Uuid) -> bool {
        self.correlation_id == Some(other)
    }
}

/// Category used to route a domain event to dashboard subscribers and the
/// audit log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventCategory {
    Ingestion,
    Orchestration,
    Coordination,
    Analytics,
    Notification,
    System,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ingestion => "ingestion",
            Self::Orchestration => "orchestration",
            Self::Coordination => "coordination",
            Self::Analytics => "analytics",
            Self::Notification => "notification",
            Self::System => "system",
        };
        write!(f, "{name}")
    }
}

pub trait EventPayload: Send + Sync + Clone {
    fn event_name(&self) -> &'static str;
    fn event_category(&self) -> EventCategory;
}
