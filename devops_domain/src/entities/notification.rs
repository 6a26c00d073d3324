// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Notification Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::NotificationId;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Slack,
    Teams,
    Discord,
    Email,
    Webhook,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub channel: NotificationChannel,
    pub severity: NotificationSeverity,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        channel: NotificationChannel,
        severity: NotificationSeverity,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            channel,
            severity,
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

/// Result of attempting to deliver a notification to every configured
/// channel; delivery is best-effort per channel, so the aggregate reports
/// partial success rather than failing the whole dispatch when one channel
/// is unreachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub succeeded: Vec<NotificationChannel>,
    pub failed: Vec<(NotificationChannel, String)>,
}

impl DispatchReport {
    pub fn is_full_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_total_failure(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}
