// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Webhook Ingestion Routes
//!
//! `POST /webhook/{source}` verifies the delivery's signature (when the
//! endpoint is configured with a secret), normalizes the payload into a
//! [`RepositoryEvent`] via [`parse_webhook_payload`], persists it, mirrors it
//! into the cache's 30-day `git_events:<id>` key and capped
//! `git_events:stream:<repo>` feed, and pushes a dashboard update. An event
//! type a platform sends but this ingestion path does not need (e.g.
//! GitHub's `star`) is accepted and silently ignored, matching
//! [`parse_webhook_payload`]'s `Ok(None)` contract.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::json;

use devops_domain::entities::{RepositoryEvent, WebhookDelivery};
use devops_domain::error::DevOpsError;
use devops_domain::services::webhook_signature;
use devops_domain::value_objects::WebhookSource;

use crate::infrastructure::ingestion::parse_webhook_payload;
use crate::presentation::error::{ApiError, ApiResult};
use crate::presentation::state::AppState;

const EVENT_TTL: Duration = Duration::from_secs(30 * 24 * 3600);
const EVENT_STREAM_MAXLEN: usize = 1000;

fn event_type_header(source: WebhookSource, headers: &HeaderMap) -> String {
    let name = match source {
        WebhookSource::GitHub => "x-github-event",
        WebhookSource::GitLab => "x-gitlab-event",
        _ => "x-event-type",
    };
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

fn verify_signature(source: WebhookSource, headers: &HeaderMap, body: &[u8], secret: &str) -> bool {
    match source {
        WebhookSource::GitHub => headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|sig| webhook_signature::verify_github_signature(body, sig, secret)),
        WebhookSource::GitLab => headers
            .get("x-gitlab-token")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|tok| webhook_signature::verify_gitlab_token(tok, secret)),
        WebhookSource::Jenkins => headers
            .get("x-hub-signature")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|sig| webhook_signature::verify_jenkins_signature(body, sig, secret)),
        _ => true,
    }
}

async fn ingest(
    state: &AppState,
    source: WebhookSource,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<serde_json::Value> {
    let Some(endpoint) = state.webhook_endpoints.get(&source) else {
        return Err(ApiError(DevOpsError::not_found(format!("no webhook endpoint configured for '{}'", source))));
    };
    if !endpoint.enabled {
        return Err(ApiError(DevOpsError::validation(format!("webhook endpoint '{}' is disabled", source))));
    }
    if endpoint.verify_signature {
        let secret = endpoint
            .secret
            .as_deref()
            .ok_or_else(|| DevOpsError::internal("endpoint requires signature verification but has no secret"))?;
        if !verify_signature(source, headers, body, secret) {
            state.metrics.webhook_deliveries_total.with_label_values(&[source.as_str(), "unauthorized"]).inc();
            return Err(ApiError(DevOpsError::auth("webhook signature verification failed")));
        }
    }

    let event_type = event_type_header(source, headers);
    let payload: serde_json::Value = serde_json::from_slice(body).map_err(DevOpsError::from)?;

    let delivery = WebhookDelivery::new(source, event_type.clone(), payload.clone(), chrono::Utc::now());
    state.webhook_deliveries.save(&delivery).await?;

    if !endpoint.accepts(&event_type) {
        state.metrics.webhook_deliveries_total.with_label_values(&[source.as_str(), "ignored"]).inc();
        return Ok(json!({ "status": "ignored", "event_type": event_type }));
    }

    let event = parse_webhook_payload(source, &event_type, &payload)?;
    let Some(event) = event else {
        state.metrics.webhook_deliveries_total.with_label_values(&[source.as_str(), "ignored"]).inc();
        return Ok(json!({ "status": "ignored", "event_type": event_type }));
    };
    event.validate()?;
    record_event(state, &event).await?;

    state.metrics.webhook_deliveries_total.with_label_values(&[source.as_str(), "accepted"]).inc();
    Ok(json!({ "status": "accepted", "event_id": event.id.as_str() }))
}

/// Persists and fans out one normalized event, shared by webhook ingestion
/// and [`crate::infrastructure::ingestion::RepositoryPoller`]'s poll loop.
///
/// An event already on record (the same delivery replayed, or the same
/// change seen by both the poller and a webhook) is saved idempotently but
/// must not repeat the cache/stream/dashboard side effects, or a single
/// change would double-post to the live dashboard feed.
pub async fn record_event(state: &AppState, event: &RepositoryEvent) -> Result<(), DevOpsError> {
    if state.events.exists(&event.id).await? {
        return Ok(());
    }
    state.events.save(event).await?;
    let event_json = serde_json::to_value(event)?;
    state.cache.set(&format!("git_events:{}", event.id.as_str()), event_json.clone(), Some(EVENT_TTL)).await?;
    state
        .cache
        .stream_add(&format!("git_events:stream:{}", event.repository.as_str()), event_json.clone(), EVENT_STREAM_MAXLEN)
        .await?;
    let _ = state.dashboard_tx.send(json!({ "type": "repository_event", "data": event_json }));
    Ok(())
}

pub async fn post_webhook_source(
    State(state): State<AppState>,
    Path(source): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let source = WebhookSource::parse(&source).ok_or_else(|| DevOpsError::validation(format!("unknown webhook source '{source}'")))?;
    Ok(Json(ingest(&state, source, &headers, &body).await?))
}

/// `POST /webhook` without a path segment: the source is inferred from
/// platform-specific delivery headers, falling back to [`WebhookSource::Generic`].
pub async fn post_webhook_generic(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let source = if headers.contains_key("x-github-event") {
        WebhookSource::GitHub
    } else if headers.contains_key("x-gitlab-event") || headers.contains_key("x-gitlab-token") {
        WebhookSource::GitLab
    } else if headers.contains_key("x-jenkins-event") {
        WebhookSource::Jenkins
    } else {
        WebhookSource::Generic
    };
    Ok(Json(ingest(&state, source, &headers, &body).await?))
}

pub async fn get_health() -> &'static str {
    "OK"
}

pub async fn get_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let endpoints: Vec<serde_json::Value> = state
        .webhook_endpoints
        .values()
        .map(|e| json!({ "source": e.source.as_str(), "enabled": e.enabled, "verify_signature": e.verify_signature }))
        .collect();
    Json(json!({
        "configured_endpoints": state.webhook_endpoints.len(),
        "endpoints": endpoints,
        "handlers_registered": ["github", "gitlab", "jenkins"],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn event_type_falls_back_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(event_type_header(WebhookSource::GitHub, &headers), "unknown");
    }

    #[test]
    fn event_type_reads_github_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", HeaderValue::from_static("push"));
        assert_eq!(event_type_header(WebhookSource::GitHub, &headers), "push");
    }
}
