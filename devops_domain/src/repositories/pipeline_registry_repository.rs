// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Registry Repository Contract

use async_trait::async_trait;

use crate::entities::PipelineRegistryEntry;
use crate::error::DevOpsError;
use crate::value_objects::{PipelineId, PlatformType};

#[async_trait]
pub trait PipelineRegistryRepository: Send + Sync {
    /// Idempotent upsert, matching `register_pipeline`'s "insert or refresh"
    /// semantics in the orchestrator this was distilled from.
    async fn upsert(&self, entry: &PipelineRegistryEntry) -> Result<(), DevOpsError>;

    async fn get(&self, id: &PipelineId) -> Result<Option<PipelineRegistryEntry>, DevOpsError>;

    async fn list_by_platform(&self, platform: PlatformType) -> Result<Vec<PipelineRegistryEntry>, DevOpsError>;

    async fn list_by_repository(&self, repository: &str) -> Result<Vec<PipelineRegistryEntry>, DevOpsError>;

    async fn list_all(&self) -> Result<Vec<PipelineRegistryEntry>, DevOpsError>;
}
