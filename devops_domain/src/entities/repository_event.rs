// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repository Event Entity
//!
//! The normalized representation of something that happened in a tracked
//! repository, whether observed by polling a local/remote git repository or
//! parsed out of an inbound webhook delivery. Both ingestion paths converge
//! on this one entity so downstream consumers (event repository, workflow
//! triggers, dashboard feed) never need to know which path an event arrived
//! on.
//!
//! Ported from `GitEvent` in the git event detector this module generalizes,
//! including its deterministic identity: two detections of the same
//! underlying change (e.g. a push seen by the poller and replayed from a
//! webhook) normalize to the same [`EventId`], making persistence of events
//! naturally idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DevOpsError;
use crate::value_objects::{EventId, EventKind, RepositoryRef};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub repository: RepositoryRef,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    pub author: Option<String>,
    pub message: Option<String>,
    pub files_changed: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RepositoryEvent {
    /// Constructs an event, deriving its id from the fields that define its
    /// identity rather than accepting a caller-supplied id. This is what
    /// makes two observations of the same change collapse to one event.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: EventKind,
        repository: RepositoryRef,
        branch: Option<String>,
        commit_hash: Option<String>,
        author: Option<String>,
        message: Option<String>,
        files_changed: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let id = EventId::derive(
            kind.as_str(),
            repository.as_str(),
            timestamp.timestamp_millis(),
            commit_hash.as_deref().unwrap_or(""),
        );
        Self {
            id,
            kind,
            repository,
            branch,
            commit_hash,
            author,
            message,
            files_changed,
            timestamp,
            metadata: HashMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), DevOpsError> {
        if self.repository.as_str().is_empty() {
            return Err(DevOpsError::validation("event repository cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryRef {
        RepositoryRef::new("org/repo").unwrap()
    }

    #[test]
    fn polled_and_replayed_events_dedupe() {
        let ts = Utc::now();
        let polled = RepositoryEvent::new(
            EventKind::Push,
            repo(),
            Some("main".into()),
            Some("abc123".into()),
            Some("alice".into()),
            Some("fix bug".into()),
            vec!["src/lib.rs".into()],
            ts,
        );
        let replayed = RepositoryEvent::new(
            EventKind::Push,
            repo(),
            Some("main".into()),
            Some("abc123".into()),
            Some("webhook-bot".into()),
            Some("Push to main".into()),
            vec![],
            ts,
        );
        assert_eq!(polled.id, replayed.id);
    }
}
