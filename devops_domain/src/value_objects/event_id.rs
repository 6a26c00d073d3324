// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Identifier Value Object
//!
//! Unlike the ULID-backed entity identifiers in this crate, an [`EventId`] is
//! a deterministic digest over the fields that define a repository event's
//! identity (kind, repository, timestamp, commit hash). Two observations of
//! the same underlying git event — one from polling, one replayed from a
//! webhook — must normalize to the same [`EventId`] so that event persistence
//! stays idempotent.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Derives a stable event id from the fields that define event identity.
    ///
    /// The hash is BLAKE3 over the pipe-joined fields, truncated to 16 hex
    /// characters — enough collision resistance for a dedup key scoped to a
    /// single repository's event stream, while staying short for log lines
    /// and Redis keys.
    pub fn derive(kind: &str, repository: &str, timestamp_ms: i64, commit_hash: &str) -> Self {
        let payload = format!("{kind}|{repository}|{timestamp_ms}|{commit_hash}");
        let digest = blake3::hash(payload.as_bytes());
        Self(hex::encode(&digest.as_bytes()[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstructs an id previously produced by [`EventId::derive`] and
    /// read back from storage.
    pub fn from_stored(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookId(String);

impl WebhookId {
    pub fn derive(source: &str, event_type: &str, timestamp_ms: i64) -> Self {
        let payload = format!("{source}|{event_type}|{timestamp_ms}");
        let digest = blake3::hash(payload.as_bytes());
        Self(hex::encode(&digest.as_bytes()[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstructs an id previously produced by [`WebhookId::derive`] and
    /// read back from storage.
    pub fn from_stored(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derive_is_deterministic() {
        let a = EventId::derive("push", "org/repo", 1_700_000_000_000, "abc123");
        let b = EventId::derive("push", "org/repo", 1_700_000_000_000, "abc123");
        assert_eq!(a, b);
    }

    #[test]
    fn derive_distinguishes_fields() {
        let a = EventId::derive("push", "org/repo", 1_700_000_000_000, "abc123");
        let b = EventId::derive("push", "org/repo", 1_700_000_000_000, "def456");
        assert_ne!(a, b);
    }

    proptest! {
        /// `derive` is a pure function of its fields: calling it twice with
        /// the same arguments must always produce the same id, independent
        /// of what those arguments are, so that a polled event and the same
        /// event replayed from a webhook dedup to one row.
        #[test]
        fn derive_is_deterministic_for_any_input(
            kind in "[a-z_]{1,12}",
            repository in "[a-zA-Z0-9/_-]{1,32}",
            timestamp_ms in 0i64..i64::MAX,
            commit_hash in "[a-f0-9]{0,40}",
        ) {
            let a = EventId::derive(&kind, &repository, timestamp_ms, &commit_hash);
            let b = EventId::derive(&kind, &repository, timestamp_ms, &commit_hash);
            prop_assert_eq!(a, b);
        }
    }
}
