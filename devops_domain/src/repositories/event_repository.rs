// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Repository Contract

use async_trait::async_trait;

use crate::entities::RepositoryEvent;
use crate::error::DevOpsError;
use crate::value_objects::{EventId, RepositoryRef};

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists an event. Implementations must treat a repeat `save` of an
    /// event with an id already on record as a no-op, not an error — this is
    /// what makes polling and webhook ingestion safely overlap.
    async fn save(&self, event: &RepositoryEvent) -> Result<(), DevOpsError>;

    async fn find_by_id(&self, id: &EventId) -> Result<Option<RepositoryEvent>, DevOpsError>;

    async fn list_recent(&self, repository: &RepositoryRef, limit: usize) -> Result<Vec<RepositoryEvent>, DevOpsError>;

    async fn exists(&self, id: &EventId) -> Result<bool, DevOpsError>;
}
