// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Webhook Payload Parsing
//!
//! Normalizes GitHub, GitLab, and Jenkins webhook JSON bodies into a
//! [`RepositoryEvent`]. Signature verification happens before parsing, at
//! the HTTP boundary (see [`crate::presentation`]); this module only
//! concerns itself with turning an already-authenticated payload into the
//! domain's event shape.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use devops_domain::entities::RepositoryEvent;
use devops_domain::error::DevOpsError;
use devops_domain::value_objects::{EventKind, RepositoryRef, WebhookSource};

/// Reads the delivery's own timestamp so that a webhook and a later replay
/// of the same delivery derive the same [`devops_domain::value_objects::EventId`].
/// Falls back to "now" only for event shapes that genuinely carry no
/// timestamp of their own (e.g. branch/tag create-delete pings).
fn event_timestamp(value: &Value, pointer: &str) -> DateTime<Utc> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn event_timestamp_millis(value: &Value, pointer: &str) -> DateTime<Utc> {
    value
        .pointer(pointer)
        .and_then(Value::as_i64)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Utc::now)
}

/// Parses a webhook body for the given source into a [`RepositoryEvent`].
/// Returns `Ok(None)` for event types this platform recognizes but does not
/// need to record (the original ingestion path's "ignored but not an
/// error" case), and `Err` only for a malformed body it cannot interpret at
/// all.
pub fn parse_webhook_payload(
    source: WebhookSource,
    event_type: &str,
    body: &Value,
) -> Result<Option<RepositoryEvent>, DevOpsError> {
    match source {
        WebhookSource::GitHub => parse_github(event_type, body),
        WebhookSource::GitLab => parse_gitlab(event_type, body),
        WebhookSource::Jenkins => parse_jenkins(event_type, body),
        _ => Ok(None),
    }
}

fn repo_ref(value: &Value, pointer: &str) -> Result<RepositoryRef, DevOpsError> {
    let name = value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| DevOpsError::validation(format!("webhook payload missing '{pointer}'")))?;
    RepositoryRef::new(name)
}

fn parse_github(event_type: &str, body: &Value) -> Result<Option<RepositoryEvent>, DevOpsError> {
    match event_type {
        "push" => {
            let repository = repo_ref(body, "/repository/full_name")?;
            let branch = body
                .get("ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("refs/heads/"))
                .map(str::to_string);
            let commit_hash = body.get("after").and_then(Value::as_str).map(str::to_string);
            let author = body
                .pointer("/pusher/name")
                .and_then(Value::as_str)
                .map(str::to_string);
            let files_changed = body
                .get("commits")
                .and_then(Value::as_array)
                .map(|commits| {
                    commits
                        .iter()
                        .flat_map(|c| {
                            ["added", "modified", "removed"]
                                .into_iter()
                                .filter_map(|key| c.get(key).and_then(Value::as_array))
                                .flatten()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                        })
                        .collect()
                })
                .unwrap_or_default();
            let timestamp = event_timestamp(body, "/head_commit/timestamp");

            Ok(Some(RepositoryEvent::new(
                EventKind::Push,
                repository,
                branch,
                commit_hash,
                author,
                Some("push webhook".to_string()),
                files_changed,
                timestamp,
            )))
        }
        "pull_request" => {
            let repository = repo_ref(body, "/repository/full_name")?;
            let branch = body
                .pointer("/pull_request/head/ref")
                .and_then(Value::as_str)
                .map(str::to_string);
            let timestamp = event_timestamp(body, "/pull_request/updated_at");
            Ok(Some(RepositoryEvent::new(
                EventKind::PullRequest,
                repository,
                branch,
                None,
                body.pointer("/sender/login").and_then(Value::as_str).map(str::to_string),
                body.pointer("/action").and_then(Value::as_str).map(str::to_string),
                Vec::new(),
                timestamp,
            )))
        }
        "create" | "delete" => {
            let repository = repo_ref(body, "/repository/full_name")?;
            let ref_type = body.get("ref_type").and_then(Value::as_str).unwrap_or("");
            let git_ref = body.get("ref").and_then(Value::as_str).map(str::to_string);
            let kind = match (event_type, ref_type) {
                ("create", "branch") => EventKind::BranchCreate,
                ("delete", "branch") => EventKind::BranchDelete,
                ("create", "tag") => EventKind::TagCreate,
                ("delete", "tag") => EventKind::TagDelete,
                _ => return Ok(None),
            };
            // GitHub's create/delete ref payloads carry no per-event timestamp field;
            // these have no commit hash either, so they are not meaningfully
            // deduplicable across ingestion paths regardless.
            Ok(Some(RepositoryEvent::new(
                kind,
                repository,
                git_ref,
                None,
                None,
                None,
                Vec::new(),
                Utc::now(),
            )))
        }
        _ => Ok(None),
    }
}

fn parse_gitlab(event_type: &str, body: &Value) -> Result<Option<RepositoryEvent>, DevOpsError> {
    match event_type {
        "Push Hook" | "push" => {
            let repository = repo_ref(body, "/project/path_with_namespace")?;
            let branch = body
                .get("ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("refs/heads/"))
                .map(str::to_string);
            // GitLab push hooks carry the per-commit timestamp on the newest
            // entry in `commits`, not on the envelope itself.
            let timestamp = body
                .get("commits")
                .and_then(Value::as_array)
                .and_then(|commits| commits.last())
                .and_then(|c| c.get("timestamp"))
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);
            Ok(Some(RepositoryEvent::new(
                EventKind::Push,
                repository,
                branch,
                body.get("after").and_then(Value::as_str).map(str::to_string),
                body.get("user_name").and_then(Value::as_str).map(str::to_string),
                Some("push webhook".to_string()),
                Vec::new(),
                timestamp,
            )))
        }
        "Merge Request Hook" | "merge_request" => {
            let repository = repo_ref(body, "/project/path_with_namespace")?;
            let timestamp = event_timestamp(body, "/object_attributes/updated_at");
            Ok(Some(RepositoryEvent::new(
                EventKind::Merge,
                repository,
                body.pointer("/object_attributes/source_branch").and_then(Value::as_str).map(str::to_string),
                None,
                body.get("user").and_then(|u| u.get("name")).and_then(Value::as_str).map(str::to_string),
                None,
                Vec::new(),
                timestamp,
            )))
        }
        _ => Ok(None),
    }
}

fn parse_jenkins(event_type: &str, body: &Value) -> Result<Option<RepositoryEvent>, DevOpsError> {
    let repository = body
        .pointer("/scm/url")
        .and_then(Value::as_str)
        .map(|url| url.trim_end_matches(".git").to_string())
        .unwrap_or_else(|| "jenkins/unknown".to_string());
    let repository = RepositoryRef::new(repository)?;
    match event_type {
        "build_started" | "build_completed" | "build_failed" => {
            let timestamp = event_timestamp_millis(body, "/build/timestamp");
            Ok(Some(RepositoryEvent::new(
                EventKind::Commit,
                repository,
                None,
                body.pointer("/scm/commit").and_then(Value::as_str).map(str::to_string),
                None,
                Some(event_type.to_string()),
                Vec::new(),
                timestamp,
            )))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn github_push_parses_branch_and_commit() {
        let body = json!({
            "ref": "refs/heads/main",
            "after": "abc123",
            "repository": {"full_name": "org/repo"},
            "pusher": {"name": "alice"},
            "commits": [{"added": ["a.rs"], "modified": [], "removed": []}]
        });
        let event = parse_webhook_payload(WebhookSource::GitHub, "push", &body).unwrap().unwrap();
        assert_eq!(event.branch.as_deref(), Some("main"));
        assert_eq!(event.files_changed, vec!["a.rs".to_string()]);
    }

    #[test]
    fn unrecognized_event_type_is_ignored() {
        let body = json!({"repository": {"full_name": "org/repo"}});
        let event = parse_webhook_payload(WebhookSource::GitHub, "star", &body).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn missing_repository_field_is_an_error() {
        let body = json!({"ref": "refs/heads/main"});
        assert!(parse_webhook_payload(WebhookSource::GitHub, "push", &body).is_err());
    }

    #[test]
    fn replaying_the_same_github_delivery_derives_the_same_event_id() {
        let body = json!({
            "ref": "refs/heads/main",
            "after": "abc123",
            "repository": {"full_name": "org/repo"},
            "pusher": {"name": "alice"},
            "head_commit": {"timestamp": "2026-01-01T00:00:00Z"},
            "commits": [{"added": ["a.rs"], "modified": [], "removed": []}]
        });
        let first = parse_webhook_payload(WebhookSource::GitHub, "push", &body).unwrap().unwrap();
        let replay = parse_webhook_payload(WebhookSource::GitHub, "push", &body).unwrap().unwrap();
        assert_eq!(first.id, replay.id);
        assert_eq!(first.timestamp.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }
}
