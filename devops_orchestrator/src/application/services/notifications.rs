// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Multi-Channel Notification Dispatch
//!
//! Ported from `notification_manager.py`'s `send_notification` /
//! `send_multi_platform`: every channel configured for a notification is
//! sent to independently and best-effort, so one channel being unreachable
//! never blocks delivery to the others. Each platform gets its own
//! idiomatic payload shape — Slack block-kit, Teams `MessageCard`, a
//! Discord embed, a subject-prefixed email body, or a generic JSON POST for
//! arbitrary webhooks — built by the `format_*` functions below and mailed
//! out over a shared [`reqwest::Client`].

use async_trait::async_trait;
use serde_json::json;

use devops_domain::entities::{DispatchReport, Notification, NotificationChannel, NotificationSeverity};
use devops_domain::error::DevOpsError;
use devops_domain::services::NotificationDispatcher;

#[derive(Debug, Clone)]
pub struct ChannelEndpoint {
    pub channel: NotificationChannel,
    pub webhook_url: String,
}

/// Slack block-kit payload: a header block plus a section with the body.
fn format_slack(notification: &Notification) -> serde_json::Value {
    json!({
        "blocks": [
            {"type": "header", "text": {"type": "plain_text", "text": notification.title}},
            {"type": "section", "text": {"type": "mrkdwn", "text": notification.body}},
        ]
    })
}

/// Teams `MessageCard` with a severity-mapped theme color.
fn format_teams(notification: &Notification) -> serde_json::Value {
    let theme_color = match notification.severity {
        NotificationSeverity::Info => "0076D7",
        NotificationSeverity::Warning => "F2C811",
        NotificationSeverity::Critical => "D70022",
    };
    json!({
        "@type": "MessageCard",
        "@context": "http://schema.org/extensions",
        "themeColor": theme_color,
        "summary": notification.title,
        "title": notification.title,
        "text": notification.body,
    })
}

/// Discord embed with a severity-mapped accent color (decimal RGB).
fn format_discord(notification: &Notification) -> serde_json::Value {
    let color = match notification.severity {
        NotificationSeverity::Info => 0x3498DB,
        NotificationSeverity::Warning => 0xF1C40F,
        NotificationSeverity::Critical => 0xE74C3C,
    };
    json!({
        "embeds": [{
            "title": notification.title,
            "description": notification.body,
            "color": color,
        }]
    })
}

/// Subject-prefixed email body; the prefix mirrors common on-call paging
/// conventions so a mail client's subject line alone conveys severity.
fn format_email(notification: &Notification) -> serde_json::Value {
    let prefix = match notification.severity {
        NotificationSeverity::Info => "[INFO]",
        NotificationSeverity::Warning => "[WARNING]",
        NotificationSeverity::Critical => "[CRITICAL]",
    };
    json!({
        "subject": format!("{prefix} {}", notification.title),
        "body": notification.body,
    })
}

/// Generic webhook payload for channels with no bespoke shape: the raw
/// notification fields as JSON.
fn format_generic(notification: &Notification) -> serde_json::Value {
    json!({
        "id": notification.id.to_string(),
        "severity": notification.severity,
        "title": notification.title,
        "body": notification.body,
        "created_at": notification.created_at,
    })
}

fn format_for(notification: &Notification, channel: NotificationChannel) -> serde_json::Value {
    match channel {
        NotificationChannel::Slack => format_slack(notification),
        NotificationChannel::Teams => format_teams(notification),
        NotificationChannel::Discord => format_discord(notification),
        NotificationChannel::Email => format_email(notification),
        NotificationChannel::Webhook => format_generic(notification),
    }
}

pub struct MultiChannelNotificationDispatcher {
    client: reqwest::Client,
    endpoints: Vec<ChannelEndpoint>,
}

impl MultiChannelNotificationDispatcher {
    pub fn new(endpoints: Vec<ChannelEndpoint>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    async fn send_one(&self, notification: &Notification, endpoint: &ChannelEndpoint) -> Result<(), DevOpsError> {
        let payload = format_for(notification, endpoint.channel);
        let response = self
            .client
            .post(&endpoint.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DevOpsError::unavailable(format!("notification delivery failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DevOpsError::unavailable(format!(
                "notification endpoint returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl NotificationDispatcher for MultiChannelNotificationDispatcher {
    /// Sends `notification` to every configured endpoint regardless of the
    /// notification's own `channel` tag, matching `send_multi_platform`'s
    /// fan-out semantics: the tag records intent/origin, delivery goes out
    /// broadly. `overall_success` is true whenever at least one channel
    /// accepted delivery.
    async fn dispatch(&self, notification: &Notification) -> Result<DispatchReport, DevOpsError> {
        if self.endpoints.is_empty() {
            return Ok(DispatchReport { succeeded: Vec::new(), failed: Vec::new() });
        }

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for endpoint in &self.endpoints {
            match self.send_one(notification, endpoint).await {
                Ok(()) => succeeded.push(endpoint.channel),
                Err(e) => failed.push((endpoint.channel, e.to_string())),
            }
        }
        Ok(DispatchReport { succeeded, failed })
    }
}

/// `successful_sends / total_sends`, per `send_multi_platform`'s summary
/// stats. Zero configured channels reports a rate of zero rather than NaN.
pub fn success_rate(report: &DispatchReport) -> f64 {
    let total = report.succeeded.len() + report.failed.len();
    if total == 0 {
        0.0
    } else {
        report.succeeded.len() as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devops_domain::value_objects::NotificationId;
    use chrono::Utc;

    fn sample_notification() -> Notification {
        Notification {
            id: NotificationId::new(),
            channel: NotificationChannel::Slack,
            severity: NotificationSeverity::Critical,
            title: "Workflow failed".into(),
            body: "build #42 failed on main".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn slack_payload_has_header_and_section_blocks() {
        let payload = format_slack(&sample_notification());
        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "header");
    }

    #[test]
    fn teams_critical_severity_uses_red_theme() {
        let payload = format_teams(&sample_notification());
        assert_eq!(payload["themeColor"], "D70022");
    }

    #[test]
    fn email_subject_is_prefixed_by_severity() {
        let payload = format_email(&sample_notification());
        assert!(payload["subject"].as_str().unwrap().starts_with("[CRITICAL]"));
    }

    #[test]
    fn success_rate_is_zero_with_no_channels() {
        let report = DispatchReport { succeeded: Vec::new(), failed: Vec::new() };
        assert_eq!(success_rate(&report), 0.0);
    }

    #[tokio::test]
    async fn dispatch_with_no_endpoints_reports_nothing() {
        let dispatcher = MultiChannelNotificationDispatcher::new(Vec::new());
        let report = dispatcher.dispatch(&sample_notification()).await.unwrap();
        assert!(report.succeeded.is_empty());
        assert!(report.failed.is_empty());
    }
}
