// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Notification Dispatch Contract

use async_trait::async_trait;

use crate::entities::{DispatchReport, Notification};
use crate::error::DevOpsError;

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends a notification to every channel configured for it. Delivery is
    /// best-effort per channel: one channel failing does not stop delivery
    /// to the others, and the aggregate report records which channels
    /// succeeded and which failed.
    async fn dispatch(&self, notification: &Notification) -> Result<DispatchReport, DevOpsError>;
}
