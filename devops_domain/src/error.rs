// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error type for the devops orchestration domain. Errors are
//! organized by how the platform boundary and the background task fabric need
//! to react to them, not by which subsystem raised them:
//!
//! - **Validation / conflict errors** are never retried; they are returned to
//!   the caller as-is.
//! - **Transient errors** (rate limited, unavailable, timeout, transient I/O)
//!   are retried by the background task fabric according to its per-queue
//!   retry profile.
//! - **Permanent errors** (corruption, permanent I/O, internal) are recorded
//!   and surfaced, never retried.
//!
//! [`DevOpsError::is_transient`] is the single source of truth the background
//! task fabric consults when deciding whether to reschedule a failed task;
//! [`DevOpsError::http_status`] is the single source of truth the webhook and
//! dashboard HTTP surfaces consult when mapping an error to a response.

use thiserror::Error;

/// Errors produced anywhere in the devops orchestration domain.
#[derive(Error, Debug, Clone)]
pub enum DevOpsError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("authentication/authorization error: {0}")]
    AuthError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    ConflictError(String),

    #[error("upstream rate limited: {0}")]
    UpstreamRateLimited(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("transient I/O error: {0}")]
    TransientIo(String),

    #[error("permanent I/O error: {0}")]
    PermanentIo(String),

    #[error("data corruption detected: {0}")]
    Corruption(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl DevOpsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConflictError(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::UpstreamRateLimited(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn transient_io(msg: impl Into<String>) -> Self {
        Self::TransientIo(msg.into())
    }

    pub fn permanent_io(msg: impl Into<String>) -> Self {
        Self::PermanentIo(msg.into())
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether the background task fabric should retry the task that
    /// produced this error, per its per-queue retry profile.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::UpstreamRateLimited(_)
                | Self::UpstreamUnavailable(_)
                | Self::Timeout(_)
                | Self::TransientIo(_)
        )
    }

    /// Whether this error originates from an upstream CI/CD platform rather
    /// than from local validation or storage.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamRateLimited(_) | Self::UpstreamUnavailable(_)
        )
    }

    /// Maps this error to the HTTP status the webhook and dashboard surfaces
    /// should return for it.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::AuthError(_) => 401,
            Self::NotFound(_) => 404,
            Self::ConflictError(_) => 409,
            Self::UpstreamRateLimited(_) => 429,
            Self::Timeout(_) => 504,
            Self::UpstreamUnavailable(_) => 502,
            Self::TransientIo(_) | Self::PermanentIo(_) | Self::Corruption(_) => 500,
            Self::InternalError(_) => 500,
        }
    }
}

impl From<std::io::Error> for DevOpsError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::TimedOut => Self::Timeout(err.to_string()),
            ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::ConnectionReset => {
                Self::TransientIo(err.to_string())
            }
            _ => Self::PermanentIo(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DevOpsError {
    fn from(err: serde_json::Error) -> Self {
        Self::ValidationError(format!("json error: {err}"))
    }
}
