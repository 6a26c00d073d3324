// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Abstraction Module
//!
//! The dashboard's `system_metrics` feed needs CPU and memory figures, and
//! the only portable way to get them is through OS-specific calls (`/proc`
//! and `sysconf` on Linux, `sysctlbyname` on macOS, `GlobalMemoryStatusEx`
//! on Windows). This module hides that behind one trait so
//! `devops_orchestrator::infrastructure::logging::SystemSampler` can sample
//! hardware without caring which OS it's running on.
//!
//! - **Interface**: [`Platform`] defines the contract
//! - **Implementations**: [`UnixPlatform`] (Linux + macOS), [`WindowsPlatform`]
//! - **Selection**: compile-time, via [`create_platform`]

use async_trait::async_trait;
use thiserror::Error;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

/// Platform-specific errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not supported on this platform: {0}")]
    NotSupported(String),

    #[error("platform error: {0}")]
    Other(String),
}

/// OS resource sampling, abstracted so the dashboard can report hardware
/// metrics without conditional compilation spreading through application
/// code.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Number of logical CPU cores available to the process.
    fn cpu_count(&self) -> usize;

    /// Total physical memory, in bytes.
    fn total_memory(&self) -> Result<u64, PlatformError>;

    /// Available (free) memory, in bytes.
    fn available_memory(&self) -> Result<u64, PlatformError>;

    /// Platform identifier used in startup logs: `"linux"`, `"macos"`,
    /// `"windows"`, or `"unix"` for an unrecognized POSIX variant.
    fn platform_name(&self) -> &'static str;
}

#[cfg(unix)]
type PlatformImpl = UnixPlatform;

#[cfg(windows)]
type PlatformImpl = WindowsPlatform;

/// Selects the platform implementation for the current OS at compile time.
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(PlatformImpl::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_platform_reports_at_least_one_cpu() {
        let platform = create_platform();
        assert!(platform.cpu_count() >= 1);
        assert!(!platform.platform_name().is_empty());
    }
}
